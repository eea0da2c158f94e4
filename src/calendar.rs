//! The calendar: conversion between instants and civil coordinates,
//! calendar arithmetic, and formatting, all in a specific time zone.
//!
//! A [`Calendar`] owns a shared, immutable [`TzInfo`]; cloning a calendar
//! clones the handle, not the table. For any instant `t` the civil offset
//! is `base_offset + dst_offset(t)`; conversions shift into local wall
//! time, defer to the [`crate::gregorian`] kernel for the civil
//! decomposition, and invert that path for the opposite direction.
//!
//! Wall-clock readings near a DST transition are resolved deterministically:
//! a reading inside the spring-forward gap maps to the transition instant
//! (the same instant as the next valid wall-clock hour), and an ambiguous
//! fall-back reading maps to the pre-transition instant.

use core::fmt;
use std::sync::Arc;

use tinystr::TinyAsciiStr;

use crate::civil::{YMDhms, YWdhms, YEAR_MAX};
use crate::error::CalendricError;
use crate::gregorian;
use crate::instant::{floor, Instant, Period, TimeSpan};
use crate::parsers;
use crate::tz::db::ISO_TZ_DATABASE;
use crate::tz::{self, TzInfo};
use crate::CalendricResult;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// The spans carrying calendar semantics, resolved from the sentinel
/// [`TimeSpan`] constants by exact value identity.
#[derive(Debug, Clone, Copy)]
enum CalendarUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour3,
}

impl CalendarUnit {
    fn from_span(dt: TimeSpan) -> Option<Self> {
        match dt {
            TimeSpan::YEAR => Some(Self::Year),
            TimeSpan::QUARTER => Some(Self::Quarter),
            TimeSpan::MONTH => Some(Self::Month),
            TimeSpan::WEEK => Some(Self::Week),
            TimeSpan::DAY => Some(Self::Day),
            TimeSpan::HOUR_3 => Some(Self::Hour3),
            _ => None,
        }
    }
}

/// A calendar bound to a time zone.
///
/// ```
/// use calendric::{Calendar, YMDhms};
///
/// let cal = Calendar::utc();
/// let t = cal.datetime(1970, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(t.micros(), 0);
/// assert_eq!(cal.calendar_units(t), YMDhms::new(1970, 1, 1, 0, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Calendar {
    tz_info: Arc<TzInfo>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    /// The UTC calendar.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            tz_info: Arc::new(TzInfo::default()),
        }
    }

    /// A fixed-offset calendar without daylight saving, named `UTC±HH`.
    #[must_use]
    pub fn from_offset(offset: TimeSpan) -> Self {
        Self {
            tz_info: Arc::new(TzInfo::fixed(offset)),
        }
    }

    /// A fixed-offset calendar from whole seconds east of Greenwich.
    #[must_use]
    pub fn from_seconds_offset(tz_seconds: i64) -> Self {
        Self::from_offset(TimeSpan::from_seconds(tz_seconds))
    }

    /// A calendar sharing existing zone info, typically obtained from a
    /// [`crate::TzDatabase`].
    #[must_use]
    pub fn from_tz_info(tz_info: Arc<TzInfo>) -> Self {
        Self { tz_info }
    }

    /// A calendar for an IANA region id, resolved against the compiled-in
    /// snapshot database.
    pub fn from_region(region: &str) -> CalendricResult<Self> {
        Ok(Self {
            tz_info: ISO_TZ_DATABASE.tz_info_from_region(region)?,
        })
    }

    /// Region ids available to [`Calendar::from_region`], sorted.
    #[must_use]
    pub fn region_id_list() -> Vec<String> {
        ISO_TZ_DATABASE.get_region_list()
    }

    /// The shared zone info.
    #[must_use]
    pub fn tz_info(&self) -> &Arc<TzInfo> {
        &self.tz_info
    }

    /// The zone designation.
    #[must_use]
    pub fn name(&self) -> TinyAsciiStr<16> {
        self.tz_info.name()
    }

    /// The total civil offset at UTC instant `t`.
    #[must_use]
    pub fn utc_offset(&self, t: Instant) -> TimeSpan {
        self.tz_info.utc_offset(t)
    }

    /// Whether daylight saving is in effect at UTC instant `t`.
    #[must_use]
    pub fn is_dst(&self, t: Instant) -> bool {
        self.tz_info.is_dst(t)
    }

    /// Civil year of a UTC instant, ignoring zone offsets.
    ///
    /// The absent value has no year and yields an invalid-instant error.
    pub fn utc_year(t: Instant) -> CalendricResult<i32> {
        if !t.is_valid() {
            return Err(
                CalendricError::invalid_instant().with_message("year of an absent instant")
            );
        }
        if t == Instant::MAX {
            return Ok(YEAR_MAX);
        }
        Ok(tz::year_of_instant(t))
    }

    /// The instant of civil coordinates `c` in this calendar's zone.
    ///
    /// The null record maps to [`Instant::NONE`] and the `max()`/`min()`
    /// records to [`Instant::MAX`]/[`Instant::MIN`]; anything else is
    /// range-checked. Readings in a skipped wall-clock hour resolve to the
    /// same instant as the next valid hour; ambiguous readings resolve to
    /// the pre-transition instant.
    pub fn time(&self, c: YMDhms) -> CalendricResult<Instant> {
        if c.is_null() {
            return Ok(Instant::NONE);
        }
        if c == YMDhms::max() {
            return Ok(Instant::MAX);
        }
        if c == YMDhms::min() {
            return Ok(Instant::MIN);
        }
        if !c.is_valid_coordinates() {
            return Err(CalendricError::invalid_coordinates()
                .with_message("calendar coordinates failed the simple range check"));
        }
        Ok(self.instant_of_local(c.local_micros()))
    }

    /// Shorthand for [`Calendar::time`] on validated coordinates.
    pub fn datetime(
        &self,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> CalendricResult<Instant> {
        self.time(YMDhms::new(year, month, day, hour, minute, second)?)
    }

    /// The instant of ISO week-date coordinates `c` in this calendar's
    /// zone, with the same sentinel and DST discipline as
    /// [`Calendar::time`].
    pub fn time_from_week(&self, c: YWdhms) -> CalendricResult<Instant> {
        if c.is_null() {
            return Ok(Instant::NONE);
        }
        if c == YWdhms::max() {
            return Ok(Instant::MAX);
        }
        if c == YWdhms::min() {
            return Ok(Instant::MIN);
        }
        if !c.is_valid_coordinates() {
            return Err(CalendricError::invalid_coordinates()
                .with_message("iso week coordinates failed the simple range check"));
        }
        let jd = gregorian::day_number_from_iso(c.iso_year, c.iso_week, c.week_day);
        let local = (jd - gregorian::UNIX_DAY) * MICROS_PER_DAY
            + (i64::from(c.hour) * 3_600 + i64::from(c.minute) * 60 + i64::from(c.second))
                * MICROS_PER_SECOND;
        Ok(self.instant_of_local(local))
    }

    /// Shorthand for [`Calendar::time_from_week`] on validated coordinates.
    pub fn datetime_from_week(
        &self,
        iso_year: i32,
        iso_week: i32,
        week_day: i32,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> CalendricResult<Instant> {
        self.time_from_week(YWdhms::new(iso_year, iso_week, week_day, hour, minute, second)?)
    }

    /// Civil coordinates of `t` in this calendar's zone. Sentinel instants
    /// map to the corresponding sentinel records.
    #[must_use]
    pub fn calendar_units(&self, t: Instant) -> YMDhms {
        if !t.is_valid() {
            return YMDhms::default();
        }
        if t == Instant::MAX {
            return YMDhms::max();
        }
        let local = t.saturating_add_span(self.utc_offset(t));
        let seconds = local.seconds();
        let day_number = gregorian::day_number_of_seconds(seconds);
        let (year, month, day) = gregorian::from_day_number(day_number);
        let second_of_day =
            (gregorian::UNIX_SECOND + seconds).rem_euclid(gregorian::SECONDS_PER_DAY);
        YMDhms {
            year,
            month,
            day,
            hour: (second_of_day / 3_600) as i32,
            minute: (second_of_day % 3_600 / 60) as i32,
            second: (second_of_day % 60) as i32,
        }
    }

    /// ISO week-date coordinates of `t` in this calendar's zone, with the
    /// same sentinel discipline as [`Calendar::calendar_units`].
    #[must_use]
    pub fn calendar_week_units(&self, t: Instant) -> YWdhms {
        if !t.is_valid() {
            return YWdhms::default();
        }
        if t == Instant::MAX {
            return YWdhms::max();
        }
        let local = t.saturating_add_span(self.utc_offset(t));
        let seconds = local.seconds();
        let day_number = gregorian::day_number_of_seconds(seconds);
        let (iso_year, iso_week, week_day) = gregorian::iso_week_date(day_number);
        let second_of_day =
            (gregorian::UNIX_SECOND + seconds).rem_euclid(gregorian::SECONDS_PER_DAY);
        YWdhms {
            iso_year,
            iso_week,
            week_day,
            hour: (second_of_day / 3_600) as i32,
            minute: (second_of_day % 3_600 / 60) as i32,
            second: (second_of_day % 60) as i32,
        }
    }

    /// Day of week of `t`, 0 = Sunday through 6 = Saturday; -1 for the
    /// absent value. Note the offset from the ISO numbering used by
    /// [`YWdhms`].
    #[must_use]
    pub fn day_of_week(&self, t: Instant) -> i32 {
        if !t.is_valid() {
            return -1;
        }
        gregorian::day_of_week(self.local_day_number(t))
    }

    /// 1-based ordinal of `t`'s day within its civil year; -1 for the
    /// absent value.
    #[must_use]
    pub fn day_of_year(&self, t: Instant) -> i32 {
        if !t.is_valid() {
            return -1;
        }
        let day_number = self.local_day_number(t);
        let (year, _, _) = gregorian::from_day_number(day_number);
        (day_number - gregorian::day_number(year, 1, 1) + 1) as i32
    }

    /// Month of `t`, 1..=12; -1 for the absent value.
    #[must_use]
    pub fn month(&self, t: Instant) -> i32 {
        if !t.is_valid() {
            return -1;
        }
        self.calendar_units(t).month
    }

    /// Quarter of `t`, 1..=4; -1 for the absent value.
    #[must_use]
    pub fn quarter(&self, t: Instant) -> i32 {
        let month = self.month(t);
        if month < 0 {
            -1
        } else {
            (month - 1) / 3 + 1
        }
    }

    /// Round `t` down to the nearest multiple of `delta_t`.
    ///
    /// The calendar sentinels trim in local civil time: `DAY` to local
    /// midnight, `WEEK` to Monday midnight, `MONTH`/`QUARTER`/`YEAR` to the
    /// first day of the unit, `HOUR_3` to the enclosing three-hour block.
    /// Any other span floors the raw microsecond count in UTC. Sentinel
    /// instants pass through unchanged.
    #[must_use]
    pub fn trim(&self, t: Instant, delta_t: TimeSpan) -> Instant {
        if !t.is_valid() || t == Instant::MAX {
            return t;
        }
        let Some(unit) = CalendarUnit::from_span(delta_t) else {
            return floor(t, delta_t);
        };
        let mut c = self.calendar_units(t);
        c.second = 0;
        c.minute = 0;
        match unit {
            CalendarUnit::Hour3 => c.hour -= c.hour % 3,
            CalendarUnit::Day => c.hour = 0,
            CalendarUnit::Week => {
                let day_number = self.local_day_number(t);
                let monday = day_number - i64::from(gregorian::iso_day_of_week(day_number) - 1);
                let (year, month, day) = gregorian::from_day_number(monday);
                c = YMDhms {
                    year,
                    month,
                    day,
                    hour: 0,
                    minute: 0,
                    second: 0,
                };
            }
            CalendarUnit::Month => {
                c.day = 1;
                c.hour = 0;
            }
            CalendarUnit::Quarter => {
                c.month -= (c.month - 1) % 3;
                c.day = 1;
                c.hour = 0;
            }
            CalendarUnit::Year => {
                c.month = 1;
                c.day = 1;
                c.hour = 0;
            }
        }
        self.instant_of_local(c.local_micros())
    }

    /// Add `n` steps of `delta_t` to `t`.
    ///
    /// Plain spans add in UTC. The calendar sentinels add in local civil
    /// time with standard carry: months roll years, and days clamp to the
    /// target month's length. A day across a DST transition is 23 or 25
    /// civil hours long but keeps the local wall-clock reading. Sentinel
    /// instants pass through unchanged.
    #[must_use]
    pub fn add(&self, t: Instant, delta_t: TimeSpan, n: i64) -> Instant {
        if !t.is_valid() || t == Instant::MAX {
            return t;
        }
        let Some(unit) = CalendarUnit::from_span(delta_t) else {
            return t + delta_t * n;
        };
        let offset_at_t = self.utc_offset(t);
        let candidate = match unit {
            CalendarUnit::Hour3 => t + TimeSpan::HOUR_3 * n,
            CalendarUnit::Day => t + TimeSpan::DAY * n,
            CalendarUnit::Week => t + TimeSpan::WEEK * n,
            CalendarUnit::Month | CalendarUnit::Quarter | CalendarUnit::Year => {
                let months = match unit {
                    CalendarUnit::Month => n,
                    CalendarUnit::Quarter => 3 * n,
                    _ => 12 * n,
                };
                let local = t.saturating_add_span(offset_at_t);
                let sub_second = local.micros().rem_euclid(MICROS_PER_SECOND);
                let shifted = add_months(&self.calendar_units(t), months);
                Instant::from_micros(shifted.local_micros() + sub_second) - offset_at_t
            }
        };
        // A DST boundary between t and the candidate shifts the wall
        // clock; compensate so the local reading is preserved.
        candidate - (self.utc_offset(candidate) - offset_at_t)
    }

    /// The distance from `t1` to `t2` in units of `delta_t`, with the
    /// remainder.
    ///
    /// Calendar sentinels count whole local units: a day across a DST
    /// transition still counts as one day. The results satisfy
    /// `add(t1, delta_t, whole) + remainder == t2` exactly. Absent inputs
    /// yield an invalid-instant error.
    pub fn diff_units(
        &self,
        t1: Instant,
        t2: Instant,
        delta_t: TimeSpan,
    ) -> CalendricResult<(i64, TimeSpan)> {
        if !t1.is_valid() || !t2.is_valid() {
            return Err(
                CalendricError::invalid_instant().with_message("difference of an absent instant")
            );
        }
        let Some(unit) = CalendarUnit::from_span(delta_t) else {
            let span = (t2 - t1).micros();
            let step = delta_t.micros();
            if step == 0 {
                return Ok((0, TimeSpan::from_micros(span)));
            }
            return Ok((span / step, TimeSpan::from_micros(span % step)));
        };
        let whole = match unit {
            CalendarUnit::Month | CalendarUnit::Quarter | CalendarUnit::Year => {
                let c1 = self.calendar_units(t1);
                let c2 = self.calendar_units(t2);
                let mut months = (i64::from(c2.year) - i64::from(c1.year)) * 12
                    + i64::from(c2.month)
                    - i64::from(c1.month);
                // whole months are counted only once the day/time tail of
                // t2 has reached that of t1
                let tail1 = self.sub_month_tail(t1, &c1);
                let tail2 = self.sub_month_tail(t2, &c2);
                if months > 0 && tail2 < tail1 {
                    months -= 1;
                } else if months < 0 && tail2 > tail1 {
                    months += 1;
                }
                match unit {
                    CalendarUnit::Month => months,
                    CalendarUnit::Quarter => months / 3,
                    _ => months / 12,
                }
            }
            CalendarUnit::Day | CalendarUnit::Week | CalendarUnit::Hour3 => {
                let local1 = t1.saturating_add_span(self.utc_offset(t1));
                let local2 = t2.saturating_add_span(self.utc_offset(t2));
                let step = match unit {
                    CalendarUnit::Day => TimeSpan::DAY,
                    CalendarUnit::Week => TimeSpan::WEEK,
                    _ => TimeSpan::HOUR_3,
                };
                (local2.micros() - local1.micros()) / step.micros()
            }
        };
        let remainder = t2 - self.add(t1, delta_t, whole);
        Ok((whole, remainder))
    }

    /// `t` as ISO-8601 extended with this calendar's offset suffix.
    #[must_use]
    pub fn to_string(&self, t: Instant) -> String {
        Zoned { cal: self, t }.to_string()
    }

    /// `p` as a half-open interval of zone-formatted instants.
    #[must_use]
    pub fn period_to_string(&self, p: &Period) -> String {
        format!(
            "[{}, {}>",
            Zoned { cal: self, t: p.start },
            Zoned { cal: self, t: p.end }
        )
    }

    fn local_day_number(&self, t: Instant) -> i64 {
        let local = t.saturating_add_span(self.utc_offset(t));
        gregorian::day_number_of_seconds(local.seconds())
    }

    /// Everything below the month of a civil reading, in microseconds, for
    /// the tail comparison in [`Calendar::diff_units`].
    fn sub_month_tail(&self, t: Instant, c: &YMDhms) -> i64 {
        let local = t.saturating_add_span(self.utc_offset(t));
        let sub_second = local.micros().rem_euclid(MICROS_PER_SECOND);
        (i64::from(c.day) * 86_400
            + i64::from(c.hour) * 3_600
            + i64::from(c.minute) * 60
            + i64::from(c.second))
            * MICROS_PER_SECOND
            + sub_second
    }

    /// Resolve a local wall reading (microseconds on the local civil line)
    /// to a UTC instant under this zone's DST rules.
    ///
    /// A wall reading has up to two interpretations, standard and DST; an
    /// interpretation is consistent when the table reports its offset at
    /// the instant it denotes. Exactly one consistent interpretation is
    /// the normal case. Two consistent interpretations form the fall-back
    /// hour and resolve to the pre-transition (earlier) instant; none form
    /// the spring-forward gap and resolve to the transition instant, which
    /// is also the instant of the next valid wall-clock hour.
    fn instant_of_local(&self, local_micros: i64) -> Instant {
        let table = self.tz_info.table();
        let x = Instant::from_micros(local_micros) - self.tz_info.base_offset();
        let year = tz::year_of_instant(x);
        let save = table.dst_offset_for_year(year);
        if save == TimeSpan::ZERO {
            return x;
        }
        let std_reading = x;
        let dst_reading = x - save;
        let std_consistent = table.dst_offset(std_reading) == TimeSpan::ZERO;
        let dst_consistent = table.dst_offset(dst_reading) == save;
        match (std_consistent, dst_consistent) {
            (true, false) => std_reading,
            (false, true) => dst_reading,
            (true, true) => std_reading.min(dst_reading),
            (false, false) => {
                // the gap sits at whichever boundary raises the offset
                let boundary = if save > TimeSpan::ZERO {
                    table.dst_start(year)
                } else {
                    table.dst_end(year)
                };
                if boundary.is_valid() {
                    boundary
                } else {
                    std_reading
                }
            }
        }
    }
}

fn add_months(c: &YMDhms, months: i64) -> YMDhms {
    let total = i64::from(c.year) * 12 + i64::from(c.month) - 1 + months;
    let year = total.div_euclid(12) as i32;
    let month = (total.rem_euclid(12) + 1) as i32;
    let day = c.day.min(gregorian::days_in_month(year, month));
    YMDhms {
        year,
        month,
        day,
        ..*c
    }
}

struct Zoned<'a> {
    cal: &'a Calendar,
    t: Instant,
}

impl fmt::Display for Zoned<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        parsers::fmt_instant(f, self.t, self.cal.utc_offset(self.t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> Calendar {
        Calendar::utc()
    }

    #[test]
    fn epoch_conversion() {
        let cal = utc();
        let t = cal.datetime(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(t, Instant::EPOCH);
        assert_eq!(
            cal.calendar_units(Instant::EPOCH),
            YMDhms::new(1970, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn sentinel_mapping() {
        let cal = utc();
        assert_eq!(cal.time(YMDhms::default()).unwrap(), Instant::NONE);
        assert_eq!(cal.time(YMDhms::max()).unwrap(), Instant::MAX);
        assert_eq!(cal.time(YMDhms::min()).unwrap(), Instant::MIN);
        assert_eq!(cal.calendar_units(Instant::NONE), YMDhms::default());
        assert_eq!(cal.calendar_units(Instant::MAX), YMDhms::max());
        assert_eq!(cal.time_from_week(YWdhms::default()).unwrap(), Instant::NONE);
        assert_eq!(cal.time_from_week(YWdhms::max()).unwrap(), Instant::MAX);
        assert_eq!(cal.calendar_week_units(Instant::MAX), YWdhms::max());
    }

    #[test]
    fn invalid_coordinates_error() {
        let cal = utc();
        let c = YMDhms {
            year: 2020,
            month: 13,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert!(cal.time(c).is_err());
        assert!(cal.datetime(2020, 1, 32, 0, 0, 0).is_err());
    }

    #[test]
    fn utc_year_of_sentinels() {
        assert!(Calendar::utc_year(Instant::NONE).is_err());
        assert_eq!(Calendar::utc_year(Instant::MAX).unwrap(), 9999);
        assert_eq!(Calendar::utc_year(Instant::EPOCH).unwrap(), 1970);
    }

    #[test]
    fn round_trip_through_civil() {
        let cal = utc();
        // a sweep at an awkward step across several months and a leap day
        let mut t = cal.datetime(2016, 1, 1, 0, 0, 0).unwrap();
        let end = cal.datetime(2016, 6, 1, 0, 0, 0).unwrap();
        let step = TimeSpan::from_minutes(12_345);
        while t < end {
            let c = cal.calendar_units(t);
            assert_eq!(cal.time(c).unwrap(), t);
            let w = cal.calendar_week_units(t);
            assert_eq!(cal.time_from_week(w).unwrap(), t);
            t = t + step;
        }
    }

    #[test]
    fn fixed_offset_shifts_civil_readings() {
        let cal = Calendar::from_seconds_offset(3_600);
        let t = cal.datetime(2020, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(t, Instant::from_seconds(1_577_876_400));
        assert_eq!(cal.calendar_units(t).hour, 12);
        assert_eq!(Calendar::utc().calendar_units(t).hour, 11);
        assert_eq!(&*cal.name(), "UTC+01");
    }

    #[test]
    fn day_month_quarter_accessors() {
        let cal = utc();
        let t = cal.datetime(2023, 11, 5, 6, 0, 0).unwrap();
        assert_eq!(cal.day_of_week(t), 0);
        assert_eq!(cal.day_of_year(t), 309);
        assert_eq!(cal.month(t), 11);
        assert_eq!(cal.quarter(t), 4);
        assert_eq!(cal.day_of_week(Instant::NONE), -1);
        assert_eq!(cal.day_of_year(Instant::NONE), -1);
        assert_eq!(cal.month(Instant::NONE), -1);
        assert_eq!(cal.quarter(Instant::NONE), -1);
    }

    #[test]
    fn trim_to_plain_spans() {
        let cal = utc();
        let t = cal.datetime(2020, 5, 17, 13, 44, 31).unwrap() + TimeSpan::from_micros(125);
        assert_eq!(
            cal.trim(t, TimeSpan::SECOND),
            cal.datetime(2020, 5, 17, 13, 44, 31).unwrap()
        );
        assert_eq!(
            cal.trim(t, TimeSpan::MINUTE),
            cal.datetime(2020, 5, 17, 13, 44, 0).unwrap()
        );
        assert_eq!(
            cal.trim(t, TimeSpan::HOUR),
            cal.datetime(2020, 5, 17, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn trim_to_calendar_units() {
        let cal = utc();
        let t = cal.datetime(2020, 5, 17, 13, 44, 31).unwrap();
        assert_eq!(
            cal.trim(t, TimeSpan::HOUR_3),
            cal.datetime(2020, 5, 17, 12, 0, 0).unwrap()
        );
        assert_eq!(
            cal.trim(t, TimeSpan::DAY),
            cal.datetime(2020, 5, 17, 0, 0, 0).unwrap()
        );
        // 2020-05-17 is a Sunday; the week starts Monday the 11th
        assert_eq!(
            cal.trim(t, TimeSpan::WEEK),
            cal.datetime(2020, 5, 11, 0, 0, 0).unwrap()
        );
        assert_eq!(
            cal.trim(t, TimeSpan::MONTH),
            cal.datetime(2020, 5, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            cal.trim(t, TimeSpan::QUARTER),
            cal.datetime(2020, 4, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            cal.trim(t, TimeSpan::YEAR),
            cal.datetime(2020, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn trim_is_idempotent() {
        let cal = utc();
        let t = cal.datetime(2019, 8, 9, 17, 5, 59).unwrap();
        for dt in [
            TimeSpan::SECOND,
            TimeSpan::MINUTE,
            TimeSpan::HOUR,
            TimeSpan::HOUR_3,
            TimeSpan::DAY,
            TimeSpan::WEEK,
            TimeSpan::MONTH,
            TimeSpan::QUARTER,
            TimeSpan::YEAR,
        ] {
            let once = cal.trim(t, dt);
            assert_eq!(cal.trim(once, dt), once, "{dt:?}");
        }
    }

    #[test]
    fn trim_propagates_sentinels() {
        let cal = utc();
        assert_eq!(cal.trim(Instant::NONE, TimeSpan::MONTH), Instant::NONE);
        assert_eq!(cal.trim(Instant::MAX, TimeSpan::DAY), Instant::MAX);
    }

    #[test]
    fn add_plain_spans() {
        let cal = utc();
        let t = cal.datetime(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            cal.add(t, TimeSpan::HOUR, 36),
            cal.datetime(2020, 1, 2, 12, 0, 0).unwrap()
        );
        assert_eq!(
            cal.add(t, TimeSpan::SECOND, -1),
            cal.datetime(2019, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn add_months_rolls_and_clamps() {
        let cal = utc();
        let t = cal.datetime(2020, 1, 31, 10, 0, 0).unwrap();
        assert_eq!(
            cal.add(t, TimeSpan::MONTH, 1),
            cal.datetime(2020, 2, 29, 10, 0, 0).unwrap()
        );
        assert_eq!(
            cal.add(t, TimeSpan::MONTH, 13),
            cal.datetime(2021, 2, 28, 10, 0, 0).unwrap()
        );
        assert_eq!(
            cal.add(t, TimeSpan::MONTH, -2),
            cal.datetime(2019, 11, 30, 10, 0, 0).unwrap()
        );
        assert_eq!(
            cal.add(t, TimeSpan::QUARTER, 1),
            cal.datetime(2020, 4, 30, 10, 0, 0).unwrap()
        );
        assert_eq!(
            cal.add(t, TimeSpan::YEAR, 1),
            cal.datetime(2021, 1, 31, 10, 0, 0).unwrap()
        );
        // a leap day clamps on non-leap years
        let leap = cal.datetime(2020, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(
            cal.add(leap, TimeSpan::YEAR, 1),
            cal.datetime(2021, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn add_propagates_sentinels() {
        let cal = utc();
        assert_eq!(cal.add(Instant::NONE, TimeSpan::DAY, 3), Instant::NONE);
        assert_eq!(cal.add(Instant::MAX, TimeSpan::DAY, 3), Instant::MAX);
    }

    #[test]
    fn diff_plain_spans() {
        let cal = utc();
        let t1 = cal.datetime(2020, 1, 1, 0, 0, 0).unwrap();
        let t2 = cal.datetime(2020, 1, 1, 2, 30, 0).unwrap();
        assert_eq!(
            cal.diff_units(t1, t2, TimeSpan::HOUR).unwrap(),
            (2, TimeSpan::from_minutes(30))
        );
        // the remainder carries the dividend's sign
        assert_eq!(
            cal.diff_units(t2, t1, TimeSpan::HOUR).unwrap(),
            (-2, TimeSpan::from_minutes(-30))
        );
        assert_eq!(
            cal.diff_units(t1, t2, TimeSpan::ZERO).unwrap(),
            (0, t2 - t1)
        );
    }

    #[test]
    fn diff_months_counts_reached_tails() {
        let cal = utc();
        let jan31 = cal.datetime(2020, 1, 31, 0, 0, 0).unwrap();
        let mar31 = cal.datetime(2020, 3, 31, 0, 0, 0).unwrap();
        let feb28 = cal.datetime(2020, 2, 28, 0, 0, 0).unwrap();
        assert_eq!(
            cal.diff_units(jan31, mar31, TimeSpan::MONTH).unwrap(),
            (2, TimeSpan::ZERO)
        );
        assert_eq!(
            cal.diff_units(jan31, feb28, TimeSpan::MONTH).unwrap(),
            (0, TimeSpan::from_days(28))
        );
    }

    #[test]
    fn diff_units_of_absent_instants_error() {
        let cal = utc();
        assert!(cal
            .diff_units(Instant::NONE, Instant::EPOCH, TimeSpan::DAY)
            .is_err());
    }

    #[test]
    fn add_diff_duality() {
        let cal = utc();
        let t1 = cal.datetime(2019, 3, 14, 1, 59, 26).unwrap();
        let t2 = cal.datetime(2021, 11, 2, 22, 4, 8).unwrap();
        for dt in [
            TimeSpan::SECOND,
            TimeSpan::from_minutes(7),
            TimeSpan::HOUR,
            TimeSpan::HOUR_3,
            TimeSpan::DAY,
            TimeSpan::WEEK,
            TimeSpan::MONTH,
            TimeSpan::QUARTER,
            TimeSpan::YEAR,
        ] {
            for (a, b) in [(t1, t2), (t2, t1)] {
                let (whole, rem) = cal.diff_units(a, b, dt).unwrap();
                assert_eq!(cal.add(a, dt, whole) + rem, b, "{dt:?}");
            }
        }
    }

    #[test]
    fn week_and_iso_units() {
        let cal = utc();
        let t = cal.datetime(2020, 1, 1, 6, 30, 0).unwrap();
        let w = cal.calendar_week_units(t);
        assert_eq!((w.iso_year, w.iso_week, w.week_day), (2020, 1, 3));
        assert_eq!((w.hour, w.minute, w.second), (6, 30, 0));
        let t = cal.datetime(2021, 1, 1, 0, 0, 0).unwrap();
        let w = cal.calendar_week_units(t);
        assert_eq!((w.iso_year, w.iso_week, w.week_day), (2020, 53, 5));
        assert_eq!(
            cal.datetime_from_week(2020, 53, 5, 0, 0, 0).unwrap(),
            t
        );
    }

    #[test]
    fn formatting() {
        let cal = utc();
        let t = cal.datetime(2016, 3, 27, 1, 0, 0).unwrap();
        assert_eq!(cal.to_string(t), "2016-03-27T01:00:00Z");
        assert_eq!(cal.to_string(Instant::NONE), "not-a-time");
        assert_eq!(cal.to_string(Instant::MAX), "+oo");
        let offset_cal = Calendar::from_seconds_offset(19_800);
        assert_eq!(offset_cal.to_string(t), "2016-03-27T06:30:00+05:30");
        let p = Period::new(t, t + TimeSpan::HOUR);
        assert_eq!(
            cal.period_to_string(&p),
            "[2016-03-27T01:00:00Z, 2016-03-27T02:00:00Z>"
        );
    }

    #[test]
    fn clones_share_zone_info() {
        let cal = Calendar::from_seconds_offset(7_200);
        let copy = cal.clone();
        assert!(Arc::ptr_eq(cal.tz_info(), copy.tz_info()));
    }
}
