use super::expr::expr;
use super::string::cut_char;
use super::{located, ws, Input};
use crate::ast::{Literal, Location, Node, Output};
use crate::value::Value;
use std::mem;
use winnow::combinator::{alt, cut_err, not, preceded, repeat, terminated};
use winnow::token::any;
use winnow::{ModalResult, Parser};

/// Parses a whole template: literal text interleaved with `${...}`
/// interpolations. The result is always an `Output` node.
pub(super) fn template(input: &mut Input) -> ModalResult<Node> {
    let (fragments, location): (Vec<(Fragment<'_>, Location)>, Location) =
        located(repeat(0.., located(fragment))).parse_next(input)?;

    Ok(Node::Output(build_output(fragments, location)))
}

#[derive(Clone)]
enum Fragment<'a> {
    Literal(&'a str),
    EscapedMarker,
    Interpolation(Node),
}

fn fragment<'a>(input: &mut Input<'a>) -> ModalResult<Fragment<'a>> {
    alt((
        "$${".value(Fragment::EscapedMarker),
        interpolation.map(Fragment::Interpolation),
        literal_text.map(Fragment::Literal),
    ))
    .parse_next(input)
}

/// Parses a single `${...}` interpolation.
///
/// Also reused for interpolations nested inside quoted strings.
pub(super) fn interpolation(input: &mut Input) -> ModalResult<Node> {
    preceded(
        ("${", ws),
        cut_err(terminated(expr, (ws, cut_char('}')))),
    )
    .parse_next(input)
}

fn literal_text<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    repeat::<_, _, (), _, _>(1.., preceded(not(alt(("$${", "${"))), any))
        .take()
        .parse_next(input)
}

fn build_output(fragments: Vec<(Fragment<'_>, Location)>, location: Location) -> Output {
    let mut exprs = Vec::new();
    let mut buf = String::new();
    let mut buf_location = location;

    for (fragment, fragment_location) in fragments {
        if buf.is_empty() {
            buf_location = fragment_location;
        }

        match fragment {
            Fragment::Literal(text) => buf.push_str(text),
            Fragment::EscapedMarker => buf.push_str("${"),
            Fragment::Interpolation(node) => {
                if !buf.is_empty() {
                    exprs.push(literal(mem::take(&mut buf), buf_location));
                }
                exprs.push(node);
            }
        }
    }

    // An empty template still renders to the empty string.
    if !buf.is_empty() || exprs.is_empty() {
        exprs.push(literal(buf, buf_location));
    }

    Output { exprs, location }
}

fn literal(text: String, location: Location) -> Node {
    Node::Literal(Literal {
        value: Value::String(text),
        location,
    })
}
