//! The template parser.

mod error;
mod expr;
mod number;
mod string;
mod template;

pub use self::error::Error;

use crate::ast::{Location, Node};
use winnow::ascii::multispace0;
use winnow::error::ContextError;
use winnow::stream::{LocatingSlice, Stateful};
use winnow::{ModalParser, ModalResult, Parser};

/// The input type for parsers in this module.
///
/// The state carries the full source so that parsers can turn byte offsets
/// into line/column positions while parsing.
pub(crate) type Input<'a> = Stateful<LocatingSlice<&'a str>, &'a str>;

/// Parses a template into its syntax tree.
///
/// The returned root node is always a [`Node::Output`], even for templates
/// that contain no interpolation at all.
///
/// # Example
///
/// ```
/// let node = interp::parse("Hello, ${name}!")?;
/// # Ok::<(), interp::parser::Error>(())
/// ```
///
/// # Errors
///
/// Returns an [`Error`] describing the offending position if the input is
/// syntactically invalid.
pub fn parse(input: &str) -> Result<Node, Error> {
    let stream = Input {
        input: LocatingSlice::new(input),
        state: input,
    };

    template::template
        .parse(stream)
        .map_err(|err| Error::from_parse_error(&err))
}

fn ws(input: &mut Input) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

/// Runs `parser` and pairs its output with the line/column position at which
/// it started matching.
fn located<'a, P, O>(mut parser: P) -> impl ModalParser<Input<'a>, (O, Location), ContextError>
where
    P: ModalParser<Input<'a>, O, ContextError>,
{
    move |input: &mut Input<'a>| {
        let source = input.state;
        let (output, span) = parser.by_ref().with_span().parse_next(input)?;
        Ok((output, error::locate(source, span.start).1))
    }
}
