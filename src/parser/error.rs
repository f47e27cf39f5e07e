use super::Input;
use crate::ast::Location;
use std::fmt;
use winnow::error::{ContextError, ParseError};

/// Error type returned when the parser encountered invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    inner: Box<ErrorInner>,
}

impl Error {
    pub(super) fn from_parse_error(err: &ParseError<Input<'_>, ContextError>) -> Error {
        let source = err.input().state;
        let offset = err.offset().min(source.len());
        let (line, location) = locate(source, offset);

        Error {
            inner: Box::new(ErrorInner {
                message: err.inner().to_string(),
                line: line.to_owned(),
                location,
                offset,
            }),
        }
    }

    /// Returns the message describing what the parser expected.
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Returns the line from the input where the error occurred.
    ///
    /// Note that this returns the full line containing the invalid input. Use
    /// [`location()`][Error::location] to obtain the column in which the
    /// error starts.
    pub fn line(&self) -> &str {
        &self.inner.line
    }

    /// Returns the location in the input at which the error occurred.
    pub fn location(&self) -> Location {
        self.inner.location
    }

    /// Returns the zero-based byte offset into the input where the error
    /// occurred.
    pub fn offset(&self) -> usize {
        self.inner.offset
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ErrorInner {
    message: String,
    line: String,
    location: Location,
    offset: usize,
}

impl ErrorInner {
    fn spacing(&self) -> String {
        " ".repeat(self.location.line.to_string().len())
    }
}

impl fmt::Display for ErrorInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{s}--> parse error in line {l}, col {c}\n\
                 {s} |\n\
                 {l} | {line}\n\
                 {s} | {caret:>c$}---\n\
                 {s} |\n\
                 {s} = {message}",
            s = self.spacing(),
            l = self.location.line,
            c = self.location.col,
            line = self.line,
            caret = '^',
            message = self.message.replace('\n', "; "),
        )
    }
}

/// Finds the full line containing `offset` and the 1-based line/column
/// position the offset maps to.
pub(super) fn locate(source: &str, offset: usize) -> (&str, Location) {
    let bytes = source.as_bytes();
    let consumed = &bytes[..offset];

    // Find the last newline before the offset.
    let line_begin = consumed
        .iter()
        .rev()
        .position(|&b| b == b'\n')
        .map_or(0, |pos| offset - pos);

    // Find the full line after that newline.
    let line = source[line_begin..]
        .find('\n')
        .map_or(&source[line_begin..], |pos| {
            &source[line_begin..line_begin + pos]
        });

    let line_number = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
    let column_number = offset - line_begin + 1;

    (
        line,
        Location {
            line: line_number,
            col: column_number,
        },
    )
}
