//! Error taxonomy shared by every layer.

use core::fmt;

/// Coarse classification of a failure.
///
/// Concrete error types stay specific (`ProductError`, `CommitError`, ...) and
/// carry structured context; `ErrorKind` is what callers branch on when mapping
/// failures to an external status code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed aggregate does not exist.
    NotFound,
    /// An aggregate with the same identity already exists.
    AlreadyExists,
    /// Malformed input (bad name, price, category).
    InvalidInput,
    /// The aggregate is in the wrong state for the requested transition.
    InvalidState,
    /// Bad discount percentage or validity period.
    InvalidDiscount,
    /// A concurrent writer changed the aggregate since it was loaded.
    Conflict,
    /// Storage or commit failure. Opaque to callers.
    Infrastructure,
}

impl ErrorKind {
    /// Domain kinds are safe to return verbatim to callers.
    pub fn is_domain(self) -> bool {
        !matches!(self, ErrorKind::Infrastructure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidDiscount => "invalid_discount",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every error type that crosses a layer boundary.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
