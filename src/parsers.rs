//! ISO-8601 string conversion.
//!
//! Parsing accepts the extended date-time grammar with an optional UTC
//! offset; a missing offset (and the `Z` designator) reads as UTC. The
//! writer side backs the `Display` implementations and
//! [`crate::Calendar::to_string`].

use core::fmt;

use ixdtf::parsers::{records::UtcOffsetRecordOrZ, IxdtfParser};

use crate::civil::YMDhms;
use crate::error::CalendricError;
use crate::gregorian;
use crate::instant::{Instant, TimeSpan};
use crate::CalendricResult;

/// Printed for the absent instant (and for [`Instant::MIN`], which shares
/// its representation).
pub(crate) const NOT_A_TIME: &str = "not-a-time";
/// Printed for [`Instant::MAX`].
pub(crate) const MAX_TOKEN: &str = "+oo";

/// Parse an extended ISO-8601 date-time string into an instant.
///
/// The date part is mandatory; a missing time reads as midnight and a
/// missing offset as UTC. Fractional seconds are honoured to microsecond
/// resolution.
///
/// ```
/// use calendric::{create_from_iso8601_string, Instant};
///
/// let t = create_from_iso8601_string("1970-01-01T00:00:00Z").unwrap();
/// assert_eq!(t, Instant::EPOCH);
/// ```
pub fn create_from_iso8601_string(s: &str) -> CalendricResult<Instant> {
    let record = IxdtfParser::from_str(s)
        .parse()
        .map_err(|e| CalendricError::parse().with_message(format!("{e}")))?;
    let Some(date) = record.date else {
        return Err(CalendricError::parse().with_message("date-time string must contain a date"));
    };
    let (hour, minute, second, fraction_micros) = match record.time {
        Some(time) => (
            i32::from(time.hour),
            i32::from(time.minute),
            // second 60 only occurs in leap-second notation; clamp it
            i32::from(time.second.min(59)),
            i64::from(
                time.fraction
                    .and_then(|f| f.to_nanoseconds())
                    .unwrap_or(0)
                    / 1_000,
            ),
        ),
        None => (0, 0, 0, 0),
    };
    let coords = YMDhms::new(
        date.year,
        i32::from(date.month),
        i32::from(date.day),
        hour,
        minute,
        second,
    )?;
    let offset_micros = match record.offset {
        Some(UtcOffsetRecordOrZ::Offset(offset)) => {
            let magnitude = (i64::from(offset.hour) * 3_600
                + i64::from(offset.minute) * 60
                + i64::from(offset.second))
                * 1_000_000
                + i64::from(
                    offset
                        .fraction
                        .and_then(|f| f.to_nanoseconds())
                        .unwrap_or(0)
                        / 1_000,
                );
            magnitude * i64::from(offset.sign as i8)
        }
        // Z and a missing offset both read as UTC
        Some(UtcOffsetRecordOrZ::Z) | None => 0,
    };
    Ok(Instant::from_micros(
        coords.local_micros() + fraction_micros - offset_micros,
    ))
}

pub(crate) fn fmt_year(f: &mut fmt::Formatter<'_>, year: i32) -> fmt::Result {
    if year < 0 {
        write!(f, "-{:04}", -i64::from(year))
    } else {
        write!(f, "{year:04}")
    }
}

/// Write `t` shifted by `offset` as ISO-8601 extended with an offset
/// suffix: `Z` for UTC, `±HH:MM` otherwise. Sentinels print as tokens.
pub(crate) fn fmt_instant(
    f: &mut fmt::Formatter<'_>,
    t: Instant,
    offset: TimeSpan,
) -> fmt::Result {
    if !t.is_valid() {
        return f.write_str(NOT_A_TIME);
    }
    if t == Instant::MAX {
        return f.write_str(MAX_TOKEN);
    }
    let local = t.saturating_add_span(offset);
    let seconds = local.seconds();
    let day_number = gregorian::day_number_of_seconds(seconds);
    let (year, month, day) = gregorian::from_day_number(day_number);
    let second_of_day = (gregorian::UNIX_SECOND + seconds).rem_euclid(gregorian::SECONDS_PER_DAY);
    let hour = second_of_day / 3_600;
    let minute = second_of_day % 3_600 / 60;
    let second = second_of_day % 60;
    fmt_year(f, year)?;
    write!(f, "-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}")?;
    if offset == TimeSpan::ZERO {
        f.write_str("Z")
    } else {
        let total_minutes = offset.micros() / 60_000_000;
        let sign = if total_minutes < 0 { '-' } else { '+' };
        let magnitude = total_minutes.abs();
        write!(f, "{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_epoch() {
        assert_eq!(
            create_from_iso8601_string("1970-01-01T00:00:00Z").unwrap(),
            Instant::EPOCH
        );
        assert_eq!(
            create_from_iso8601_string("1970-01-01T00:00:00").unwrap(),
            Instant::EPOCH
        );
        assert_eq!(
            create_from_iso8601_string("1970-01-01").unwrap(),
            Instant::EPOCH
        );
    }

    #[test]
    fn parses_offsets() {
        // 2016-03-27T03:00:00+02:00 is 01:00:00Z
        let t = create_from_iso8601_string("2016-03-27T03:00:00+02:00").unwrap();
        let z = create_from_iso8601_string("2016-03-27T01:00:00Z").unwrap();
        assert_eq!(t, z);
        let western = create_from_iso8601_string("2019-12-31T19:00:00-05:00").unwrap();
        let utc = create_from_iso8601_string("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(western, utc);
    }

    #[test]
    fn parses_fractions_to_microseconds() {
        let t = create_from_iso8601_string("1970-01-01T00:00:00.000001Z").unwrap();
        assert_eq!(t, Instant::from_micros(1));
        let t = create_from_iso8601_string("1970-01-01T00:00:01.5Z").unwrap();
        assert_eq!(t, Instant::from_micros(1_500_000));
    }

    #[test]
    fn rejects_malformed_strings() {
        for s in ["", "not a date", "2020-13-01T00:00:00Z", "2020-01-01T25:00:00Z"] {
            let err = create_from_iso8601_string(s).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::Parse | ErrorKind::InvalidCoordinates),
                "unexpected kind for {s:?}: {err}"
            );
        }
    }

    #[test]
    fn instant_display_round_trips() {
        for s in [
            "1970-01-01T00:00:00Z",
            "2016-03-27T01:00:00Z",
            "1969-12-31T23:59:59Z",
            "0001-01-01T00:00:00Z",
        ] {
            let t = create_from_iso8601_string(s).unwrap();
            assert_eq!(t.to_string(), s);
        }
    }

    #[test]
    fn sentinel_tokens() {
        assert_eq!(Instant::NONE.to_string(), "not-a-time");
        assert_eq!(Instant::MAX.to_string(), "+oo");
    }

    #[test]
    fn negative_year_formatting() {
        let t = create_from_iso8601_string("-0044-03-15T12:00:00Z").unwrap();
        assert_eq!(t.to_string(), "-0044-03-15T12:00:00Z");
    }
}
