//! POSIX 1003.1 TZ rules as a DST rule source.
//!
//! A [`PosixZone`] holds a parsed POSIX TZ string (`STD offset [DST
//! [offset]],start[/time],end[/time]`) and evaluates its transition rules
//! against a civil year. POSIX quotes offsets west-positive; they are
//! negated into the east-positive convention used everywhere else at parse
//! time. Transition times are local wall clock readings, quoted in standard
//! time for the start rule and in DST time for the end rule, and may range
//! over ±167 hours per the extended grammar.

use core::iter::Peekable;
use core::str::Chars;

use tinystr::TinyAsciiStr;

use crate::error::CalendricError;
use crate::gregorian;
use crate::instant::{Instant, TimeSpan};
use crate::CalendricResult;

use super::DstRules;

// Transition time defaults to 02:00 local; the DST offset defaults to one
// hour ahead of standard time.
const DEFAULT_RULE_TIME: i64 = 2 * 3_600;
const DEFAULT_DST_SHIFT: i64 = 3_600;
const MAX_RULE_TIME: i64 = 167 * 3_600;
const MAX_ZONE_OFFSET: i64 = 24 * 3_600 - 1;

/// A time zone described by a POSIX TZ string, e.g.
/// `CET-1CEST,M3.5.0,M10.5.0/3`.
#[derive(Debug, Clone)]
pub struct PosixZone {
    std_abbr: TinyAsciiStr<16>,
    std_offset: TimeSpan,
    dst: Option<PosixDst>,
}

#[derive(Debug, Clone, Copy)]
struct PosixDst {
    abbr: TinyAsciiStr<16>,
    offset: TimeSpan,
    start: PosixDateTime,
    end: PosixDateTime,
}

#[derive(Debug, Clone, Copy)]
enum PosixDate {
    /// `Jn`: day 1..=365, February 29th never counted.
    JulianNoLeap(u16),
    /// `n`: zero-based day 0..=365, counting February 29th in leap years.
    JulianLeap(u16),
    /// `Mm.w.d`: day `d` (0 = Sunday) of week `w` (5 = last) of month `m`.
    MonthWeekDay(u8, u8, u8),
}

#[derive(Debug, Clone, Copy)]
struct PosixDateTime {
    date: PosixDate,
    /// Local clock seconds relative to the day's midnight.
    time: i64,
}

impl PosixZone {
    /// Parse a POSIX TZ string.
    pub fn parse(tz: &str) -> CalendricResult<Self> {
        let mut chars = tz.chars().peekable();
        let std_abbr = parse_designation(&mut chars)?;
        let std_offset = TimeSpan::from_seconds(-parse_hms(&mut chars, MAX_ZONE_OFFSET)?);
        if chars.peek().is_none() {
            return Ok(Self {
                std_abbr,
                std_offset,
                dst: None,
            });
        }
        let abbr = parse_designation(&mut chars)?;
        let offset = if chars.peek() == Some(&',') {
            std_offset + TimeSpan::from_seconds(DEFAULT_DST_SHIFT)
        } else {
            TimeSpan::from_seconds(-parse_hms(&mut chars, MAX_ZONE_OFFSET)?)
        };
        expect(&mut chars, ',')?;
        let start = parse_rule(&mut chars)?;
        expect(&mut chars, ',')?;
        let end = parse_rule(&mut chars)?;
        if chars.peek().is_some() {
            return Err(
                CalendricError::parse().with_message("trailing input after POSIX TZ rules")
            );
        }
        Ok(Self {
            std_abbr,
            std_offset,
            dst: Some(PosixDst {
                abbr,
                offset,
                start,
                end,
            }),
        })
    }

    /// The standard (base) offset east of Greenwich.
    #[must_use]
    pub fn std_offset(&self) -> TimeSpan {
        self.std_offset
    }

    /// Whether the rule carries a DST clause.
    #[must_use]
    pub fn has_dst(&self) -> bool {
        self.dst.is_some()
    }

    /// The DST designation, e.g. `CEST`, when a DST clause is present.
    #[must_use]
    pub fn dst_designation(&self) -> Option<TinyAsciiStr<16>> {
        self.dst.as_ref().map(|dst| dst.abbr)
    }
}

impl DstRules for PosixZone {
    fn dst_start(&self, year: i32) -> Instant {
        match &self.dst {
            // the start rule's clock reading applies while standard time
            // is still in effect
            Some(dst) => transition_instant(year, dst.start, self.std_offset),
            None => Instant::NONE,
        }
    }

    fn dst_end(&self, year: i32) -> Instant {
        match &self.dst {
            // the end rule's clock reading applies while DST is in effect
            Some(dst) => transition_instant(year, dst.end, dst.offset),
            None => Instant::NONE,
        }
    }

    fn dst_offset(&self, _year: i32) -> TimeSpan {
        match &self.dst {
            Some(dst) => dst.offset - self.std_offset,
            None => TimeSpan::ZERO,
        }
    }

    fn designation(&self) -> TinyAsciiStr<16> {
        self.std_abbr
    }
}

/// UTC instant of a transition in `year`. `wall_offset` is the civil offset
/// in effect while the rule's clock reading applies.
fn transition_instant(year: i32, rule: PosixDateTime, wall_offset: TimeSpan) -> Instant {
    let day_number = transition_day_number(rule.date, year);
    let local_seconds =
        (day_number - gregorian::UNIX_DAY) * gregorian::SECONDS_PER_DAY + rule.time;
    Instant::from_seconds(local_seconds) - wall_offset
}

/// Serial day number of a transition rule in `year`.
fn transition_day_number(date: PosixDate, year: i32) -> i64 {
    let jan1 = gregorian::day_number(year, 1, 1);
    match date {
        PosixDate::JulianNoLeap(n) => {
            let mut day_of_year = i64::from(n);
            if n >= 60 && gregorian::is_leap_year(year) {
                day_of_year += 1;
            }
            jan1 + day_of_year - 1
        }
        PosixDate::JulianLeap(n) => {
            // day 365 falls back to December 31st in plain years
            let day_of_year = (i64::from(n) + 1).min(i64::from(gregorian::days_in_year(year)));
            jan1 + day_of_year - 1
        }
        PosixDate::MonthWeekDay(month, week, weekday) => {
            let month = i32::from(month);
            let first = gregorian::day_number(year, month, 1);
            let lead = (i32::from(weekday) - gregorian::day_of_week(first)).rem_euclid(7);
            let mut day = 1 + lead + 7 * (i32::from(week) - 1);
            while day > gregorian::days_in_month(year, month) {
                day -= 7;
            }
            first + i64::from(day) - 1
        }
    }
}

// ==== Scanner helpers ====

fn parse_designation(chars: &mut Peekable<Chars<'_>>) -> CalendricResult<TinyAsciiStr<16>> {
    let mut name = String::new();
    if chars.peek() == Some(&'<') {
        chars.next();
        loop {
            match chars.next() {
                Some('>') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '+' || c == '-' => name.push(c),
                _ => {
                    return Err(CalendricError::parse()
                        .with_message("unterminated quoted zone designation"))
                }
            }
        }
    } else {
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            name.push(c);
            chars.next();
        }
    }
    if name.len() < 3 {
        return Err(
            CalendricError::parse().with_message("zone designation shorter than three characters")
        );
    }
    TinyAsciiStr::from_bytes(name.as_bytes())
        .map_err(|_| CalendricError::parse().with_message("zone designation too long"))
}

/// Parse `[+|-]h[h[h]][:mm[:ss]]` into signed seconds, bounded by
/// `max_seconds`. Hours take a third digit only when the bound needs one.
fn parse_hms(chars: &mut Peekable<Chars<'_>>, max_seconds: i64) -> CalendricResult<i64> {
    let sign = match chars.peek() {
        Some(&'+') => {
            chars.next();
            1
        }
        Some(&'-') => {
            chars.next();
            -1
        }
        _ => 1,
    };
    let hour_digits = if max_seconds > 99 * 3_600 { 3 } else { 2 };
    let mut total = parse_number(chars, hour_digits)? * 3_600;
    if advance_on(chars, ':') {
        total += parse_minute_or_second(chars)? * 60;
        if advance_on(chars, ':') {
            total += parse_minute_or_second(chars)?;
        }
    }
    if total > max_seconds {
        return Err(CalendricError::parse().with_message("time value out of range"));
    }
    Ok(sign * total)
}

fn parse_rule(chars: &mut Peekable<Chars<'_>>) -> CalendricResult<PosixDateTime> {
    let date = match chars.peek() {
        Some(&'M') => {
            chars.next();
            let month = parse_number(chars, 2)?;
            expect(chars, '.')?;
            let week = parse_number(chars, 1)?;
            expect(chars, '.')?;
            let weekday = parse_number(chars, 1)?;
            if !(1..=12).contains(&month) || !(1..=5).contains(&week) || !(0..=6).contains(&weekday)
            {
                return Err(
                    CalendricError::parse().with_message("month.week.day rule out of range")
                );
            }
            PosixDate::MonthWeekDay(month as u8, week as u8, weekday as u8)
        }
        Some(&'J') => {
            chars.next();
            let day = parse_number(chars, 3)?;
            if !(1..=365).contains(&day) {
                return Err(CalendricError::parse().with_message("julian day out of range"));
            }
            PosixDate::JulianNoLeap(day as u16)
        }
        _ => {
            let day = parse_number(chars, 3)?;
            if day > 365 {
                return Err(CalendricError::parse().with_message("day of year out of range"));
            }
            PosixDate::JulianLeap(day as u16)
        }
    };
    let time = if advance_on(chars, '/') {
        parse_hms(chars, MAX_RULE_TIME)?
    } else {
        DEFAULT_RULE_TIME
    };
    Ok(PosixDateTime { date, time })
}

fn parse_number(chars: &mut Peekable<Chars<'_>>, max_digits: u32) -> CalendricResult<i64> {
    let mut value = 0i64;
    let mut digits = 0;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        if digits == max_digits {
            return Err(CalendricError::parse().with_message("number has too many digits"));
        }
        value = value * 10 + i64::from(digit);
        digits += 1;
        chars.next();
    }
    if digits == 0 {
        return Err(CalendricError::parse().with_message("expected a number"));
    }
    Ok(value)
}

/// Exactly two digits, 00 through 59.
fn parse_minute_or_second(chars: &mut Peekable<Chars<'_>>) -> CalendricResult<i64> {
    let tens = parse_digit(chars)?;
    let ones = parse_digit(chars)?;
    let value = tens * 10 + ones;
    if value > 59 {
        return Err(CalendricError::parse().with_message("minute or second out of range"));
    }
    Ok(value)
}

fn parse_digit(chars: &mut Peekable<Chars<'_>>) -> CalendricResult<i64> {
    chars
        .next()
        .and_then(|c| c.to_digit(10))
        .map(i64::from)
        .ok_or_else(|| CalendricError::parse().with_message("expected a digit"))
}

fn expect(chars: &mut Peekable<Chars<'_>>, expected: char) -> CalendricResult<()> {
    if chars.next() == Some(expected) {
        Ok(())
    } else {
        Err(CalendricError::parse().with_message(format!("expected '{expected}'")))
    }
}

fn advance_on(chars: &mut Peekable<Chars<'_>>, expected: char) -> bool {
    if chars.peek() == Some(&expected) {
        chars.next();
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gregorian::{day_number, UNIX_DAY};

    fn utc_instant(y: i32, m: i32, d: i32, h: i64) -> Instant {
        Instant::from_seconds((day_number(y, m, d) - UNIX_DAY) * 86_400 + h * 3_600)
    }

    #[test]
    fn central_european_rules() {
        let zone = PosixZone::parse("CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(1));
        assert!(zone.has_dst());
        assert_eq!(&*zone.designation(), "CET");
        assert_eq!(zone.dst_designation().as_deref(), Some("CEST"));
        assert_eq!(zone.dst_offset(2016), TimeSpan::from_hours(1));

        // 2016: last Sunday of March is the 27th, transition 02:00 CET.
        assert_eq!(zone.dst_start(2016), utc_instant(2016, 3, 27, 1));
        // Last Sunday of October is the 30th, transition 03:00 CEST.
        assert_eq!(zone.dst_end(2016), utc_instant(2016, 10, 30, 1));
    }

    #[test]
    fn us_eastern_rules() {
        let zone = PosixZone::parse("EST5EDT,M3.2.0,M11.1.0").unwrap();
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(-5));
        // 2017: second Sunday of March is the 12th, 02:00 EST.
        assert_eq!(zone.dst_start(2017), utc_instant(2017, 3, 12, 7));
        // First Sunday of November is the 5th, 02:00 EDT.
        assert_eq!(zone.dst_end(2017), utc_instant(2017, 11, 5, 6));
    }

    #[test]
    fn southern_hemisphere_rules_wrap_the_year() {
        let zone = PosixZone::parse("AEST-10AEDT,M10.1.0,M4.1.0/3").unwrap();
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(10));
        // 2016: first Sunday of October is the 2nd, 02:00 AEST.
        let start = zone.dst_start(2016);
        assert_eq!(start, utc_instant(2016, 10, 1, 16));
        // First Sunday of April is the 3rd, 03:00 AEDT.
        let end = zone.dst_end(2016);
        assert_eq!(end, utc_instant(2016, 4, 2, 16));
        assert!(end < start);
    }

    #[test]
    fn fixed_offset_rule() {
        let zone = PosixZone::parse("JST-9").unwrap();
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(9));
        assert!(!zone.has_dst());
        assert_eq!(zone.dst_offset(2000), TimeSpan::ZERO);
        assert_eq!(zone.dst_start(2000), Instant::NONE);
        assert!(zone.dst_designation().is_none());
    }

    #[test]
    fn quoted_and_fractional_offsets() {
        let zone = PosixZone::parse("<+0330>-3:30").unwrap();
        assert_eq!(&*zone.designation(), "+0330");
        assert_eq!(
            zone.std_offset(),
            TimeSpan::from_hours(3) + TimeSpan::from_minutes(30)
        );
        let zone = PosixZone::parse("<-03>3").unwrap();
        assert_eq!(&*zone.designation(), "-03");
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(-3));
        // a half-hour zone's default saving is still one hour
        let zone = PosixZone::parse("NST3:30NDT,M3.2.0,M11.1.0").unwrap();
        assert_eq!(
            zone.std_offset(),
            TimeSpan::from_hours(-3) - TimeSpan::from_minutes(30)
        );
        assert_eq!(zone.dst_offset(2020), TimeSpan::from_hours(1));
        assert_eq!(zone.dst_designation().as_deref(), Some("NDT"));
    }

    #[test]
    fn explicit_dst_offsets() {
        let zone = PosixZone::parse("STD-1DST-2:30,M3.5.0,M10.5.0").unwrap();
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(1));
        assert_eq!(
            zone.dst_offset(2020),
            TimeSpan::from_hours(1) + TimeSpan::from_minutes(30)
        );
    }

    #[test]
    fn julian_day_rules_skip_leap_days() {
        // J60 is March 1st in every year.
        let zone = PosixZone::parse("STD0DST,J60,J300").unwrap();
        let leap = zone.dst_start(2016);
        let plain = zone.dst_start(2017);
        assert_eq!(leap, utc_instant(2016, 3, 1, 2));
        assert_eq!(plain, utc_instant(2017, 3, 1, 2));
    }

    #[test]
    fn zero_based_day_rules_count_leap_days() {
        // Day 59 zero-based is doy 60: Feb 29th in leap years, Mar 1st otherwise.
        let zone = PosixZone::parse("STD0DST,59,300").unwrap();
        assert_eq!(zone.dst_start(2016), utc_instant(2016, 2, 29, 2));
        assert_eq!(zone.dst_start(2017), utc_instant(2017, 3, 1, 2));
    }

    #[test]
    fn transition_times_beyond_midnight() {
        // 26:00 on the fourth Thursday reads as 02:00 two days after Wednesday...
        let zone = PosixZone::parse("IST-2IDT,M3.4.4/26,M10.5.0").unwrap();
        // 2021: fourth Thursday of March is the 25th; 26:00 reaches into the 26th.
        assert_eq!(zone.dst_start(2021), utc_instant(2021, 3, 26, 0));
        // negative times reach into the previous day
        let zone = PosixZone::parse("WGT3WGST,M3.5.0/-2,M10.5.0/-1").unwrap();
        // 2021: last Sunday of March is the 28th; -2:00 lands on the 27th at 22:00.
        assert_eq!(zone.dst_start(2021), utc_instant(2021, 3, 28, 1));
    }

    #[test]
    fn negative_dst_rules() {
        // Ireland models winter as the saving period with a negative shift.
        let zone = PosixZone::parse("IST-1GMT0,M10.5.0,M3.5.0/1").unwrap();
        assert_eq!(zone.std_offset(), TimeSpan::from_hours(1));
        assert_eq!(zone.dst_offset(2020), TimeSpan::from_hours(-1));
        let start = zone.dst_start(2020);
        let end = zone.dst_end(2020);
        // The saving period runs October through March.
        assert!(start > end);
        assert_eq!(start, utc_instant(2020, 10, 25, 1));
        assert_eq!(end, utc_instant(2020, 3, 29, 1));
    }

    #[test]
    fn malformed_strings_are_rejected() {
        for tz in [
            "",
            "not a tz",
            "CET",
            "AB1",
            "<CET-1",
            "CET-1CEST",
            "CET-1CEST,M3.5.0",
            "CET-1CEST,M13.5.0,M10.5.0",
            "CET-1CEST,M3.6.0,M10.5.0",
            "CET-1CEST,M3.5.7,M10.5.0",
            "CET-1CEST,J366,J1",
            "CET-1CEST,366,1",
            "CET-25CEST,M3.5.0,M10.5.0",
            "CET-1:60CEST,M3.5.0,M10.5.0",
            "CET-1CEST,M3.5.0,M10.5.0,",
            "CET-1CEST,M3.5.0,M10.5.0/999",
        ] {
            assert!(PosixZone::parse(tz).is_err(), "{tz:?} should not parse");
        }
    }
}
