//! Civil and ISO-week calendar coordinates.

use crate::error::CalendricError;
use crate::CalendricResult;

/// Largest civil year handled by coordinate validation.
pub const YEAR_MAX: i32 = 9999;
/// Smallest civil year handled by coordinate validation.
pub const YEAR_MIN: i32 = -9999;

/// Civil calendar coordinates: year, month, day, hour, minute, second.
///
/// The all-zero value is the distinguished *null* record standing for "no
/// time"; [`crate::Calendar::time`] maps it to [`crate::Instant::NONE`].
/// Fields are public and unchecked; [`YMDhms::new`] validates ranges, and
/// the conversions in [`crate::Calendar`] re-validate on entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YMDhms {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl YMDhms {
    /// Create coordinates, validating the simple field ranges.
    ///
    /// The check is a range check only; 2019-02-31 passes here and is caught
    /// by the day-number conversion consumers.
    pub fn new(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> CalendricResult<Self> {
        let c = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        if c.is_valid() {
            Ok(c)
        } else {
            Err(CalendricError::invalid_coordinates()
                .with_message("calendar coordinates failed the simple range check"))
        }
    }

    /// Midnight at the start of the given date.
    pub fn date(year: i32, month: i32, day: i32) -> CalendricResult<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Whether each field is within its plain range. Null is not valid
    /// coordinates.
    #[must_use]
    pub const fn is_valid_coordinates(&self) -> bool {
        !(self.year < YEAR_MIN
            || self.year > YEAR_MAX
            || self.month < 1
            || self.month > 12
            || self.day < 1
            || self.day > 31
            || self.hour < 0
            || self.hour > 23
            || self.minute < 0
            || self.minute > 59
            || self.second < 0
            || self.second > 59)
    }

    /// The all-zero "no time" record.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.year == 0
            && self.month == 0
            && self.day == 0
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
    }

    /// Null or valid coordinates.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_null() || self.is_valid_coordinates()
    }

    /// The coordinates mapped to [`crate::Instant::MAX`].
    #[must_use]
    pub const fn max() -> Self {
        Self {
            year: YEAR_MAX,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 59,
        }
    }

    /// The coordinates mapped to [`crate::Instant::MIN`].
    #[must_use]
    pub const fn min() -> Self {
        Self {
            year: YEAR_MIN,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Microseconds since the epoch of these coordinates read as local wall
    /// time, before any zone offset is applied.
    pub(crate) fn local_micros(&self) -> i64 {
        let days = crate::gregorian::day_number(self.year, self.month, self.day)
            - crate::gregorian::UNIX_DAY;
        let seconds = days * crate::gregorian::SECONDS_PER_DAY
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second);
        seconds * 1_000_000
    }
}

/// ISO-8601 week-date coordinates: ISO year, ISO week, weekday
/// (1 = Monday .. 7 = Sunday), hour, minute, second.
///
/// Follows the same null/min/max discipline as [`YMDhms`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YWdhms {
    pub iso_year: i32,
    pub iso_week: i32,
    pub week_day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl YWdhms {
    /// Create coordinates, validating the simple field ranges.
    pub fn new(
        iso_year: i32,
        iso_week: i32,
        week_day: i32,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> CalendricResult<Self> {
        let c = Self {
            iso_year,
            iso_week,
            week_day,
            hour,
            minute,
            second,
        };
        if c.is_valid() {
            Ok(c)
        } else {
            Err(CalendricError::invalid_coordinates()
                .with_message("iso week coordinates failed the simple range check"))
        }
    }

    /// Whether each field is within its plain range. A week of 53 passes the
    /// range check even for ISO years with 52 weeks.
    #[must_use]
    pub const fn is_valid_coordinates(&self) -> bool {
        !(self.iso_year < YEAR_MIN
            || self.iso_year > YEAR_MAX
            || self.iso_week < 1
            || self.iso_week > 53
            || self.week_day < 1
            || self.week_day > 7
            || self.hour < 0
            || self.hour > 23
            || self.minute < 0
            || self.minute > 59
            || self.second < 0
            || self.second > 59)
    }

    /// The all-zero "no time" record.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.iso_year == 0
            && self.iso_week == 0
            && self.week_day == 0
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
    }

    /// Null or valid coordinates.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_null() || self.is_valid_coordinates()
    }

    /// The coordinates mapped to [`crate::Instant::MAX`].
    #[must_use]
    pub const fn max() -> Self {
        Self {
            iso_year: YEAR_MAX,
            iso_week: 52,
            week_day: 6,
            hour: 23,
            minute: 59,
            second: 59,
        }
    }

    /// The coordinates mapped to [`crate::Instant::MIN`].
    #[must_use]
    pub const fn min() -> Self {
        Self {
            iso_year: YEAR_MIN,
            iso_week: 1,
            week_day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}
