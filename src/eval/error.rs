use crate::ast::Location;
use crate::value::Type;
use std::fmt;

/// The result type used by check and evaluation operations.
pub type EvalResult<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by the checks and the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    inner: Box<ErrorKind>,
    location: Option<Location>,
}

impl Error {
    pub(super) fn located(kind: ErrorKind, location: Location) -> Error {
        Error {
            inner: Box::new(kind),
            location: Some(location),
        }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> &ErrorKind {
        &self.inner
    }

    /// Returns the source position of the node the error refers to, if
    /// known.
    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} in {location}", self.inner),
            None => fmt::Display::fmt(&self.inner, f),
        }
    }
}

impl std::error::Error for Error {}

/// The kinds of errors the checks and the evaluator can produce.
///
/// The unknown-value placeholder is never an error: expressions touching
/// unknown input evaluate successfully to unknown.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A generic error message, used by caller-supplied semantic checks.
    Message(String),
    /// A variable was referenced but not bound in the scope.
    UndefinedVariable(String),
    /// A function was called but not defined in the scope.
    UndefinedFunction(String),
    /// A function was called with the wrong number of arguments.
    Arity {
        /// The function name.
        name: String,
        /// The number of declared positional parameters.
        expected: usize,
        /// Whether the function accepts additional variadic arguments.
        variadic: bool,
        /// The number of arguments in the call.
        given: usize,
    },
    /// A value of one type was used where another type was required and no
    /// implicit conversion exists between the two.
    TypeMismatch {
        /// The required type.
        expected: Type,
        /// The type that was found.
        actual: Type,
    },
    /// A value of an unexpected type was found. The second field describes
    /// what would have been accepted.
    Unexpected(Type, &'static str),
    /// A conditional branch would produce a type conditionals do not
    /// support.
    UnsupportedConditionalType(Type),
    /// The target of an index operation was not a plain variable.
    UnsupportedIndexTarget,
    /// A list or map mixes elements of different types.
    HeterogeneousCollection {
        /// The variable name of the collection.
        name: String,
        /// The element type seen first.
        expected: Type,
        /// The conflicting element type.
        actual: Type,
    },
    /// A function callback returned an error.
    FuncCall(String, String),
    /// A list index was out of bounds.
    IndexOutOfBounds {
        /// The requested index.
        index: i64,
        /// The length of the list.
        length: usize,
    },
    /// A map was indexed with a key it does not contain.
    NoSuchKey(String),
    /// An empty collection was indexed.
    EmptyCollection(String),
    /// A template fragment produced a value that cannot be part of the
    /// rendered string.
    NonStringOutput(Type),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Message(msg) => f.write_str(msg),
            ErrorKind::UndefinedVariable(name) => write!(f, "undefined variable `{name}`"),
            ErrorKind::UndefinedFunction(name) => write!(f, "undefined function `{name}`"),
            ErrorKind::Arity {
                name,
                expected,
                variadic,
                given,
            } => {
                let suffix = if *variadic { " or more" } else { "" };
                write!(
                    f,
                    "function `{name}` expects {expected}{suffix} arguments, got {given}"
                )
            }
            ErrorKind::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, got {actual}")
            }
            ErrorKind::Unexpected(ty, wanted) => {
                write!(f, "unexpected {ty} value, expected {wanted}")
            }
            ErrorKind::UnsupportedConditionalType(ty) => {
                write!(f, "conditional branches cannot produce {ty} values")
            }
            ErrorKind::UnsupportedIndexTarget => f.write_str("only variables can be indexed"),
            ErrorKind::HeterogeneousCollection {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "collection `{name}` mixes {expected} and {actual} elements"
                )
            }
            ErrorKind::FuncCall(name, msg) => write!(f, "error calling `{name}`: {msg}"),
            ErrorKind::IndexOutOfBounds { index, length } => {
                write!(f, "index {index} out of bounds (length {length})")
            }
            ErrorKind::NoSuchKey(key) => write!(f, "no such key: `{key}`"),
            ErrorKind::EmptyCollection(name) => write!(f, "collection `{name}` is empty"),
            ErrorKind::NonStringOutput(ty) => {
                write!(f, "template fragment produced a {ty} value, expected a string")
            }
        }
    }
}
