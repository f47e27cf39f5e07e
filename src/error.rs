//! The `Error` and `Result` types used by this crate.

use crate::{eval, parser};
use std::fmt;

/// The result type used by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents all error variants this crate can produce.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The input is not a syntactically valid template.
    Parse(parser::Error),
    /// A check or the evaluation of a template failed.
    Eval(eval::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => fmt::Display::fmt(err, f),
            Error::Eval(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Eval(err) => Some(err),
        }
    }
}

impl From<parser::Error> for Error {
    fn from(err: parser::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<eval::Error> for Error {
    fn from(err: eval::Error) -> Error {
        Error::Eval(err)
    }
}
