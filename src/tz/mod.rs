//! The time-zone model: per-year DST tables and zone info.
//!
//! A [`TzTable`] stores, for every civil year in a bounded window, the UTC
//! period during which daylight saving is in effect and the offset it adds.
//! The table-driven shape keeps historically changing rules cheap to look
//! up: resolving the offset at an instant is two vector reads. Tables are
//! populated from an abstract [`DstRules`] source, typically a
//! [`posix::PosixZone`], and combined with a base offset into a [`TzInfo`].

pub mod db;
pub mod posix;

mod iana;

use tinystr::{tinystr, TinyAsciiStr};

use crate::gregorian;
use crate::instant::{Instant, Period, TimeSpan};

/// First civil year covered by the canonical table window. POSIX time
/// bottoms out in 1901, so the window starts just above it.
pub const TZ_TABLE_START_YEAR: i32 = 1905;
/// Number of years in the canonical table window, 1905..2105.
pub const TZ_TABLE_YEARS: usize = 200;

/// A source of daylight-saving rules, queried per civil year.
///
/// Implementations report the UTC instants at which DST comes into and goes
/// out of effect in a given year, and the offset applied in between. A year
/// without daylight saving yields an invalid period and a zero offset.
pub trait DstRules {
    /// UTC instant at which DST takes effect in `year`.
    fn dst_start(&self, year: i32) -> Instant;
    /// UTC instant at which DST ends in `year`.
    fn dst_end(&self, year: i32) -> Instant;
    /// Offset added on top of the base offset while DST is in effect.
    fn dst_offset(&self, year: i32) -> TimeSpan;
    /// Zone designation, e.g. `CET`.
    fn designation(&self) -> TinyAsciiStr<16>;
}

/// A civil-year-indexed table of DST periods.
///
/// `dst[i]` holds the half-open UTC period of year `start_year + i`, and
/// `dt[i]` the offset applied during it. A table with an empty `dst` vector
/// encodes a fixed-offset zone and reports a zero DST offset everywhere.
/// Years outside the window also fall back to a zero DST offset; distant
/// past and future collapse to standard time rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TzTable {
    start_year: i32,
    name: TinyAsciiStr<16>,
    dst: Vec<Period>,
    dt: Vec<TimeSpan>,
}

impl Default for TzTable {
    fn default() -> Self {
        Self::fixed(TimeSpan::ZERO)
    }
}

impl TzTable {
    /// Populate a table from a rule source over the canonical
    /// [1905, 2105) window.
    #[must_use]
    pub fn from_rules(rules: &impl DstRules) -> Self {
        Self::from_rules_in(rules, TZ_TABLE_START_YEAR, TZ_TABLE_YEARS)
    }

    /// Populate a table from a rule source over an explicit year window.
    #[must_use]
    pub fn from_rules_in(rules: &impl DstRules, start_year: i32, n_years: usize) -> Self {
        let mut dst = Vec::with_capacity(n_years);
        let mut dt = Vec::with_capacity(n_years);
        for year in start_year..start_year + n_years as i32 {
            dst.push(Period::new(rules.dst_start(year), rules.dst_end(year)));
            dt.push(rules.dst_offset(year));
        }
        Self {
            start_year,
            name: rules.designation(),
            dst,
            dt,
        }
    }

    /// A DST-less table for a fixed offset east of Greenwich, named
    /// `UTC±HH` with the sign mandatory and the hour two-digit.
    #[must_use]
    pub fn fixed(offset: TimeSpan) -> Self {
        let hours = offset.micros() / TimeSpan::HOUR.micros();
        let name = format!("UTC{hours:+03}");
        Self {
            start_year: 0,
            name: TinyAsciiStr::from_bytes(name.as_bytes()).unwrap_or(tinystr!(16, "UTC+00")),
            dst: Vec::new(),
            dt: Vec::new(),
        }
    }

    /// Whether the table carries any DST periods at all.
    #[must_use]
    pub fn is_dst(&self) -> bool {
        !self.dst.is_empty()
    }

    /// The zone designation.
    #[must_use]
    pub fn name(&self) -> TinyAsciiStr<16> {
        self.name
    }

    /// First year of the table window.
    #[must_use]
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    fn row(&self, year: i32) -> Option<usize> {
        let index = year as i64 - self.start_year as i64;
        if (0..self.dst.len() as i64).contains(&index) {
            Some(index as usize)
        } else {
            None
        }
    }

    /// UTC instant at which DST takes effect in `year`, or
    /// [`Instant::NONE`] when the table has no entry.
    #[must_use]
    pub fn dst_start(&self, year: i32) -> Instant {
        self.row(year).map_or(Instant::NONE, |i| self.dst[i].start)
    }

    /// UTC instant at which DST ends in `year`, or [`Instant::NONE`] when
    /// the table has no entry.
    #[must_use]
    pub fn dst_end(&self, year: i32) -> Instant {
        self.row(year).map_or(Instant::NONE, |i| self.dst[i].end)
    }

    pub(crate) fn dst_offset_for_year(&self, year: i32) -> TimeSpan {
        self.row(year).map_or(TimeSpan::ZERO, |i| self.dt[i])
    }

    /// The DST offset in effect at UTC instant `t`.
    ///
    /// A start instant below the end instant describes the usual
    /// northern-hemisphere summer period; a start above the end describes a
    /// southern-hemisphere period wrapping the year boundary.
    #[must_use]
    pub fn dst_offset(&self, t: Instant) -> TimeSpan {
        if self.dst.is_empty() || !t.is_valid() {
            return TimeSpan::ZERO;
        }
        let year = year_of_instant(t);
        let Some(index) = self.row(year) else {
            return TimeSpan::ZERO;
        };
        let period = self.dst[index];
        if !period.valid() {
            return TimeSpan::ZERO;
        }
        let in_dst = if period.start < period.end {
            period.start <= t && t < period.end
        } else {
            t < period.end || t >= period.start
        };
        if in_dst {
            self.dt[index]
        } else {
            TimeSpan::ZERO
        }
    }
}

/// A base UTC offset paired with a DST table.
///
/// Effectively immutable after construction; calendars share it behind an
/// `Arc` across threads without synchronisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TzInfo {
    base_offset: TimeSpan,
    table: TzTable,
}

impl TzInfo {
    /// Combine a base offset with a DST table.
    #[must_use]
    pub fn new(base_offset: TimeSpan, table: TzTable) -> Self {
        Self { base_offset, table }
    }

    /// A fixed-offset zone without daylight saving, named `UTC±HH`.
    #[must_use]
    pub fn fixed(offset: TimeSpan) -> Self {
        Self {
            base_offset: offset,
            table: TzTable::fixed(offset),
        }
    }

    /// The zone designation.
    #[must_use]
    pub fn name(&self) -> TinyAsciiStr<16> {
        self.table.name()
    }

    /// The base offset east of Greenwich.
    #[must_use]
    pub fn base_offset(&self) -> TimeSpan {
        self.base_offset
    }

    /// The total civil offset at UTC instant `t`.
    #[must_use]
    pub fn utc_offset(&self, t: Instant) -> TimeSpan {
        self.base_offset + self.table.dst_offset(t)
    }

    /// Whether daylight saving is in effect at UTC instant `t`.
    #[must_use]
    pub fn is_dst(&self, t: Instant) -> bool {
        self.table.dst_offset(t) != TimeSpan::ZERO
    }

    /// The underlying DST table.
    #[must_use]
    pub fn table(&self) -> &TzTable {
        &self.table
    }
}

/// Civil year of a UTC instant; the caller screens out the absent value.
pub(crate) fn year_of_instant(t: Instant) -> i32 {
    gregorian::from_day_number(gregorian::day_number_of_seconds(t.seconds())).0
}
