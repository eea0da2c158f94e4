//! `calendric` is a calendar and time arithmetic engine.
//!
//! The crate converts between a linear microsecond-resolution [`Instant`]
//! on the UTC timeline and human calendar coordinates ([`YMDhms`],
//! [`YWdhms`]), performs calendar-aware arithmetic, and honours
//! daylight-saving rules through table-driven time zones.
//!
//! The central type is [`Calendar`], which binds the conversions to a time
//! zone:
//!
//! ```
//! use calendric::{Calendar, TimeSpan};
//!
//! let oslo = Calendar::from_region("Europe/Oslo").unwrap();
//! let noon = oslo.datetime(2016, 3, 26, 12, 0, 0).unwrap();
//! // adding one calendar day across the spring transition keeps the
//! // wall clock and yields a 23-hour day
//! let next = oslo.add(noon, TimeSpan::DAY, 1);
//! assert_eq!(next - noon, TimeSpan::from_hours(23));
//! assert_eq!(oslo.calendar_units(next).hour, 12);
//! ```
//!
//! Time zones come from the compiled-in IANA snapshot
//! ([`Calendar::from_region`]), from a user-supplied rules file
//! ([`TzDatabase::load_from_file`]), or from POSIX TZ strings registered
//! with [`TzDatabase::add_tz_info`]. All values are cheap to copy or clone;
//! a `Calendar` shares its immutable [`TzInfo`] and may cross threads
//! freely.
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

pub mod error;
pub mod gregorian;
pub mod tz;

pub(crate) mod calendar;
pub(crate) mod civil;
pub(crate) mod instant;
pub(crate) mod parsers;

/// Re-export of `TinyAsciiStr` from `tinystr`, used for zone designations.
pub use tinystr::TinyAsciiStr;

#[doc(inline)]
pub use error::CalendricError;

/// The crate's result type.
pub type CalendricResult<T> = Result<T, CalendricError>;

pub use calendar::Calendar;
pub use civil::{YMDhms, YWdhms, YEAR_MAX, YEAR_MIN};
pub use gregorian::{UNIX_DAY, UNIX_SECOND};
pub use instant::{floor, intersection, Instant, Period, TimeSpan};
pub use parsers::create_from_iso8601_string;
pub use tz::db::TzDatabase;
pub use tz::{DstRules, TzInfo, TzTable, TZ_TABLE_START_YEAR, TZ_TABLE_YEARS};
