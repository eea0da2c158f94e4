//! The time-zone database: named lookups over shared zone info.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::error::CalendricError;
use crate::CalendricResult;

use super::posix::PosixZone;
use super::{iana, DstRules, TzInfo, TzTable};

/// The process-wide database built from the compiled-in IANA snapshot.
/// Built on first use and immutable afterwards.
pub static ISO_TZ_DATABASE: LazyLock<TzDatabase> = LazyLock::new(TzDatabase::iso_db);

/// Region- and short-name-keyed maps of shared [`TzInfo`] values.
///
/// The database is mutable only while it is being populated (`load_*`,
/// [`add_tz_info`](TzDatabase::add_tz_info)); afterwards lookups are
/// read-only and safe for concurrent readers. Both maps share the same
/// `Arc<TzInfo>` values.
#[derive(Debug, Clone, Default)]
pub struct TzDatabase {
    region_map: BTreeMap<String, Arc<TzInfo>>,
    name_map: BTreeMap<String, Arc<TzInfo>>,
}

impl TzDatabase {
    /// An empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A database populated from the compiled-in IANA snapshot.
    #[must_use]
    pub fn iso_db() -> Self {
        let mut db = Self::new();
        db.load_from_iso_db();
        db
    }

    /// Populate from the compiled-in IANA snapshot.
    ///
    /// The embedded entries are validated by the crate's tests, so parse
    /// failures are unreachable and skipped rather than surfaced.
    pub fn load_from_iso_db(&mut self) {
        for (region, posix) in iana::ISO_TZ_DB {
            let _ = self.add_tz_info(region, posix);
        }
    }

    /// Populate from a text file of `region_name,posix_tz_string` lines.
    /// Blank lines and `#` comments are ignored.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> CalendricResult<()> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalendricError::parse().with_message(e.to_string()))?;
        self.load_from_str(&text)
    }

    /// Populate from in-memory text in the [`load_from_file`] format.
    ///
    /// [`load_from_file`]: TzDatabase::load_from_file
    pub fn load_from_str(&mut self, text: &str) -> CalendricResult<()> {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((region, posix)) = line.split_once(',') else {
                return Err(CalendricError::parse()
                    .with_message(format!("expected 'region,posix_tz' line, got '{line}'")));
            };
            self.add_tz_info(region.trim(), posix.trim())?;
        }
        Ok(())
    }

    /// Register one zone under `region` (e.g. `Europe/Copenhagen`) from a
    /// POSIX TZ string, constructing its table over the canonical window.
    ///
    /// The zone is also registered in the short-name map under its standard
    /// and DST designations; an already-taken short name keeps its first
    /// registration.
    pub fn add_tz_info(&mut self, region: &str, posix_tz: &str) -> CalendricResult<()> {
        let zone = PosixZone::parse(posix_tz)?;
        let base = zone.std_offset();
        let table = if zone.has_dst() {
            TzTable::from_rules(&zone)
        } else {
            TzTable::fixed(base)
        };
        let info = Arc::new(TzInfo::new(base, table));
        self.region_map
            .insert(region.to_string(), Arc::clone(&info));
        self.name_map
            .entry(zone.designation().to_string())
            .or_insert_with(|| Arc::clone(&info));
        if let Some(dst_name) = zone.dst_designation() {
            self.name_map.entry(dst_name.to_string()).or_insert(info);
        }
        Ok(())
    }

    /// Look up a zone by region identifier, e.g. `Europe/Copenhagen`.
    pub fn tz_info_from_region(&self, region: &str) -> CalendricResult<Arc<TzInfo>> {
        self.region_map.get(region).cloned().ok_or_else(|| {
            CalendricError::not_found().with_message(format!("tz region '{region}' not found"))
        })
    }

    /// Look up a zone by short name, e.g. `CET`.
    pub fn tz_info_from_name(&self, name: &str) -> CalendricResult<Arc<TzInfo>> {
        self.name_map.get(name).cloned().ok_or_else(|| {
            CalendricError::not_found().with_message(format!("tz name '{name}' not found"))
        })
    }

    /// All registered region identifiers, sorted.
    #[must_use]
    pub fn get_region_list(&self) -> Vec<String> {
        self.region_map.keys().cloned().collect()
    }

    /// All registered short names, sorted.
    #[must_use]
    pub fn get_name_list(&self) -> Vec<String> {
        self.name_map.keys().cloned().collect()
    }
}
