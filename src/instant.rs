//! The instant type, spans, and the half-open period algebra.
//!
//! Time is linear: an [`Instant`] is a signed count of microseconds since
//! 1970-01-01T00:00:00 UTC, an ordinary number on the UTC time axis. This is
//! well defined and cheap to move around on every platform; everything
//! calendar-shaped lives in [`crate::calendar`].

use core::fmt;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::time::SystemTime;

use crate::parsers;

pub(crate) const MICROS_PER_SECOND: i64 = 1_000_000;

/// A point on the UTC timeline, counted in microseconds since the Unix epoch.
///
/// Three sentinel values are reserved: [`Instant::MIN`], [`Instant::MAX`] and
/// [`Instant::NONE`]. `NONE` shares `MIN`'s bit pattern and is told apart
/// from it only contextually, via [`Instant::is_valid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instant(i64);

impl Instant {
    /// The smallest representable instant.
    pub const MIN: Instant = Instant(i64::MIN);
    /// The largest representable instant.
    pub const MAX: Instant = Instant(i64::MAX);
    /// The absent value. Compares equal to [`Instant::MIN`].
    pub const NONE: Instant = Instant::MIN;
    /// 1970-01-01T00:00:00Z.
    pub const EPOCH: Instant = Instant(0);

    /// Create an instant from a raw microsecond count.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Create an instant from a count of whole seconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds * MICROS_PER_SECOND)
    }

    /// The raw microsecond count.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Whole seconds since the epoch, rounded toward negative infinity.
    #[inline]
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.0.div_euclid(MICROS_PER_SECOND)
    }

    /// `false` for the absent value (and therefore for [`Instant::MIN`],
    /// which shares its representation).
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Instant::NONE.0
    }

    /// The current system clock reading, saturated into range.
    #[must_use]
    pub fn now() -> Self {
        match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
            Ok(since) => Self(i64::try_from(since.as_micros()).unwrap_or(i64::MAX)),
            Err(before) => {
                let micros = i64::try_from(before.duration().as_micros()).unwrap_or(i64::MAX);
                Self(micros.wrapping_neg())
            }
        }
    }

    #[inline]
    pub(crate) const fn saturating_add_span(self, span: TimeSpan) -> Self {
        Self(self.0.saturating_add(span.0))
    }
}

impl Add<TimeSpan> for Instant {
    type Output = Instant;
    #[inline]
    fn add(self, rhs: TimeSpan) -> Instant {
        Instant(self.0 + rhs.0)
    }
}

impl Sub<TimeSpan> for Instant {
    type Output = Instant;
    #[inline]
    fn sub(self, rhs: TimeSpan) -> Instant {
        Instant(self.0 - rhs.0)
    }
}

impl Sub for Instant {
    type Output = TimeSpan;
    #[inline]
    fn sub(self, rhs: Instant) -> TimeSpan {
        TimeSpan(self.0 - rhs.0)
    }
}

impl AddAssign<TimeSpan> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: TimeSpan) {
        self.0 += rhs.0;
    }
}

impl SubAssign<TimeSpan> for Instant {
    #[inline]
    fn sub_assign(&mut self, rhs: TimeSpan) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Instant {
    /// ISO-8601 extended, read in UTC. See [`crate::Calendar::to_string`]
    /// for zone-aware formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        parsers::fmt_instant(f, *self, TimeSpan::ZERO)
    }
}

/// A signed span of time in microseconds.
///
/// Besides the plain duration constants (`SECOND` through `WEEK`), the type
/// carries the calendar-unit sentinels `MONTH`, `QUARTER` and `YEAR`: spans
/// whose real length depends on civil context. The sentinels sit close to
/// the nominal unit lengths but are offset by a few microseconds so that no
/// user-built whole-unit duration can collide with them; [`crate::Calendar`]
/// dispatches on their exact values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSpan(i64);

impl TimeSpan {
    /// The empty span.
    pub const ZERO: TimeSpan = TimeSpan(0);
    /// One second.
    pub const SECOND: TimeSpan = TimeSpan(MICROS_PER_SECOND);
    /// One minute.
    pub const MINUTE: TimeSpan = TimeSpan(60 * MICROS_PER_SECOND);
    /// One hour.
    pub const HOUR: TimeSpan = TimeSpan(3_600 * MICROS_PER_SECOND);
    /// Three hours, stepped with calendar semantics by [`crate::Calendar`].
    pub const HOUR_3: TimeSpan = TimeSpan(3 * 3_600 * MICROS_PER_SECOND);
    /// One calendar day (23, 24 or 25 civil hours across DST transitions).
    pub const DAY: TimeSpan = TimeSpan(86_400 * MICROS_PER_SECOND);
    /// One calendar week, starting Monday.
    pub const WEEK: TimeSpan = TimeSpan(7 * 86_400 * MICROS_PER_SECOND);
    /// The calendar-month sentinel (30 days + 43 µs).
    pub const MONTH: TimeSpan = TimeSpan(2_592_000_000_043);
    /// The calendar-quarter sentinel (90 days + 61 µs).
    pub const QUARTER: TimeSpan = TimeSpan(7_776_000_000_061);
    /// The calendar-year sentinel (365 days + 83 µs).
    pub const YEAR: TimeSpan = TimeSpan(31_536_000_000_083);

    /// Create a span from a raw microsecond count.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Create a span of whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds * MICROS_PER_SECOND)
    }

    /// Create a span of whole minutes.
    #[inline]
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60 * MICROS_PER_SECOND)
    }

    /// Create a span of whole hours.
    #[inline]
    #[must_use]
    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * 3_600 * MICROS_PER_SECOND)
    }

    /// Create a span of whole 24-hour days.
    #[inline]
    #[must_use]
    pub const fn from_days(days: i64) -> Self {
        Self(days * 86_400 * MICROS_PER_SECOND)
    }

    /// The raw microsecond count.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// The span as fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_seconds_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND as f64
    }

    /// A span from fractional seconds, rounded to the nearest microsecond.
    #[inline]
    #[must_use]
    pub fn from_seconds_f64(seconds: f64) -> Self {
        Self((seconds * MICROS_PER_SECOND as f64).round() as i64)
    }

    /// The absolute value of the span.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl Add for TimeSpan {
    type Output = TimeSpan;
    #[inline]
    fn add(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan(self.0 + rhs.0)
    }
}

impl Sub for TimeSpan {
    type Output = TimeSpan;
    #[inline]
    fn sub(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan(self.0 - rhs.0)
    }
}

impl Neg for TimeSpan {
    type Output = TimeSpan;
    #[inline]
    fn neg(self) -> TimeSpan {
        TimeSpan(-self.0)
    }
}

impl Mul<i64> for TimeSpan {
    type Output = TimeSpan;
    #[inline]
    fn mul(self, rhs: i64) -> TimeSpan {
        TimeSpan(self.0 * rhs)
    }
}

/// The greatest multiple of `dt` not exceeding `t`.
///
/// `dt == 0` returns `t` unchanged. The computation is exact for negative
/// instants. A negative `dt` flips the rounding direction, effectively a
/// ceiling; callers that need plain flooring pass a positive `dt`.
#[must_use]
pub fn floor(t: Instant, dt: TimeSpan) -> Instant {
    let den = dt.micros();
    if den == 0 {
        return t;
    }
    let num = t.micros();
    let quot = num / den;
    let rem = num % den;
    if (num ^ den) < 0 && rem != 0 {
        Instant::from_micros(den * (quot - 1))
    } else {
        Instant::from_micros(den * quot)
    }
}

/// A half-open period `[start, end)` on the UTC timeline.
///
/// The default period carries the absent value at both ends and is not
/// [`valid`](Period::valid); it doubles as the "no overlap" marker returned
/// by [`intersection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    pub start: Instant,
    pub end: Instant,
}

impl Default for Period {
    fn default() -> Self {
        Self {
            start: Instant::NONE,
            end: Instant::NONE,
        }
    }
}

impl Period {
    /// Create a period from its endpoints.
    #[inline]
    #[must_use]
    pub const fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    /// The signed length `end - start`.
    #[inline]
    #[must_use]
    pub fn timespan(&self) -> TimeSpan {
        self.end - self.start
    }

    /// Both endpoints present and `start <= end`.
    #[inline]
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid() && self.start.micros() <= self.end.micros()
    }

    /// `start <= t < end`. Always `false` for invalid periods or instants.
    #[inline]
    #[must_use]
    pub fn contains(&self, t: Instant) -> bool {
        t.is_valid() && self.valid() && self.start <= t && t < self.end
    }

    /// Whether `other` lies entirely within this period.
    #[inline]
    #[must_use]
    pub fn contains_period(&self, other: &Period) -> bool {
        self.valid() && other.valid() && other.start >= self.start && other.end <= self.end
    }

    /// Whether the two periods share at least one instant.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Period) -> bool {
        !(other.start >= self.end || other.end <= self.start)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}>", self.start, self.end)
    }
}

/// The overlap of two periods, or the default (marker) period when the
/// overlap is empty.
#[must_use]
pub fn intersection(a: &Period, b: &Period) -> Period {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if start <= end {
        Period::new(start, end)
    } else {
        Period::default()
    }
}
