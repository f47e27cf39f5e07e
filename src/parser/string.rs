use super::template::interpolation;
use super::{located, Input};
use crate::ast::{Literal, Location, Node, Output};
use crate::value::Value;
use std::mem;
use winnow::combinator::{alt, cut_err, dispatch, empty, fail, not, preceded, repeat, terminated};
use winnow::error::{ContextError, StrContext, StrContextValue};
use winnow::token::{any, one_of, take_while};
use winnow::{ModalParser, ModalResult, Parser};

/// Parses a double-quoted string.
///
/// Quoted strings are templates themselves: they may contain nested
/// `${...}` interpolations, in which case the result is an `Output` node
/// rather than a plain string literal.
pub(super) fn quoted(input: &mut Input) -> ModalResult<Node> {
    let (fragments, location): (Vec<(StringFragment<'_>, Location)>, Location) = located(
        preceded(
            '"',
            terminated(repeat(0.., located(string_fragment)), cut_char('"')),
        ),
    )
    .parse_next(input)?;

    Ok(build_node(fragments, location))
}

#[derive(Clone)]
enum StringFragment<'a> {
    Literal(&'a str),
    EscapedChar(char),
    EscapedMarker,
    Interpolation(Node),
}

fn string_fragment<'a>(input: &mut Input<'a>) -> ModalResult<StringFragment<'a>> {
    alt((
        "$${".value(StringFragment::EscapedMarker),
        interpolation.map(StringFragment::Interpolation),
        escaped_char.map(StringFragment::EscapedChar),
        string_literal.map(StringFragment::Literal),
    ))
    .parse_next(input)
}

fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    repeat::<_, _, (), _, _>(
        1..,
        preceded(
            not(alt((
                "$${".void(),
                "${".void(),
                one_of(['"', '\\']).void(),
            ))),
            any,
        ),
    )
    .take()
    .parse_next(input)
}

fn escaped_char(input: &mut Input) -> ModalResult<char> {
    preceded(
        '\\',
        dispatch! {any;
            'n' => empty.value('\n'),
            'r' => empty.value('\r'),
            't' => empty.value('\t'),
            '\\' => empty.value('\\'),
            '"' => empty.value('"'),
            'u' => cut_err(hexescape::<4>.verify_map(char::from_u32))
                .context(StrContext::Label("unicode escape sequence")),
            'U' => cut_err(hexescape::<8>.verify_map(char::from_u32))
                .context(StrContext::Label("unicode escape sequence")),
            _ => cut_err(fail)
                .context(StrContext::Label("escape sequence"))
                .context(StrContext::Expected(StrContextValue::CharLiteral('n')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('r')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('t')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('\\')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('"')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('u')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('U'))),
        },
    )
    .parse_next(input)
}

fn hexescape<const N: usize>(input: &mut Input) -> ModalResult<u32> {
    take_while(N, |c: char| c.is_ascii_hexdigit())
        .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok())
        .parse_next(input)
}

fn build_node(fragments: Vec<(StringFragment<'_>, Location)>, location: Location) -> Node {
    let mut exprs = Vec::new();
    let mut buf = String::new();
    let mut buf_location = location;

    for (fragment, fragment_location) in fragments {
        if buf.is_empty() {
            buf_location = fragment_location;
        }

        match fragment {
            StringFragment::Literal(text) => buf.push_str(text),
            StringFragment::EscapedChar(ch) => buf.push(ch),
            StringFragment::EscapedMarker => buf.push_str("${"),
            StringFragment::Interpolation(node) => {
                if !buf.is_empty() {
                    exprs.push(literal(mem::take(&mut buf), buf_location));
                }
                exprs.push(node);
            }
        }
    }

    if exprs.is_empty() {
        return Node::Literal(Literal {
            value: Value::String(buf),
            location,
        });
    }

    if !buf.is_empty() {
        exprs.push(literal(buf, buf_location));
    }

    Node::Output(Output { exprs, location })
}

fn literal(text: String, location: Location) -> Node {
    Node::Literal(Literal {
        value: Value::String(text),
        location,
    })
}

/// Parses a dotted identifier such as `var.foo.*.id`.
///
/// Identifiers admit `-` within segments, and a segment may be a lone `*`.
/// The whole path is returned as one name; scopes resolve it opaquely.
pub(super) fn ident<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (
        ident_segment,
        repeat::<_, _, (), _, _>(0.., preceded('.', alt(('*'.void(), ident_segment)))),
    )
        .take()
        .parse_next(input)
}

fn ident_segment(input: &mut Input) -> ModalResult<()> {
    (one_of(is_id_start), take_while(0.., is_id_continue))
        .void()
        .parse_next(input)
}

fn is_id_start(ch: char) -> bool {
    unicode_ident::is_xid_start(ch) || ch == '_'
}

fn is_id_continue(ch: char) -> bool {
    unicode_ident::is_xid_continue(ch) || ch == '-'
}

pub(super) fn cut_char<'a>(c: char) -> impl ModalParser<Input<'a>, char, ContextError> {
    cut_err(c).context(StrContext::Expected(StrContextValue::CharLiteral(c)))
}
