//! The error type used across the crate.

use core::fmt;
use std::borrow::Cow;

/// The category of a [`CalendricError`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Civil or ISO-week coordinates failed range validation.
    InvalidCoordinates,
    /// A region or short-name lookup failed in the time-zone database.
    NotFound,
    /// An ISO-8601 or POSIX TZ string was malformed.
    Parse,
    /// An operation that requires a valid instant was given the absent value.
    InvalidInstant,
    /// An internal assertion failed.
    Assert,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidCoordinates => "invalid coordinates",
            Self::NotFound => "not found",
            Self::Parse => "parse error",
            Self::InvalidInstant => "invalid instant",
            Self::Assert => "implementation error",
        };
        f.write_str(s)
    }
}

/// The error returned by fallible calendar, parsing, and database operations.
///
/// Errors carry an [`ErrorKind`] and an optional human-readable message and
/// are built with the kind constructors:
///
/// ```
/// use calendric::error::CalendricError;
///
/// let err = CalendricError::not_found().with_message("tz region 'Mars/Olympus' not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendricError {
    kind: ErrorKind,
    msg: Cow<'static, str>,
}

impl CalendricError {
    #[inline]
    #[must_use]
    const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: Cow::Borrowed(""),
        }
    }

    /// Create an invalid-coordinates error.
    #[must_use]
    pub const fn invalid_coordinates() -> Self {
        Self::new(ErrorKind::InvalidCoordinates)
    }

    /// Create a not-found error.
    #[must_use]
    pub const fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Create a parse error.
    #[must_use]
    pub const fn parse() -> Self {
        Self::new(ErrorKind::Parse)
    }

    /// Create an invalid-instant error.
    #[must_use]
    pub const fn invalid_instant() -> Self {
        Self::new(ErrorKind::InvalidInstant)
    }

    /// Create an internal assertion error.
    #[must_use]
    pub const fn assert() -> Self {
        Self::new(ErrorKind::Assert)
    }

    /// Attach a message to this error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.msg = msg.into();
        self
    }

    /// The error's kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error's message, empty when none was attached.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for CalendricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.msg.is_empty() {
            write!(f, ": {}", self.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for CalendricError {}
