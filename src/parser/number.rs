use super::Input;
use crate::value::Value;
use std::str::FromStr;
use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, opt, preceded, terminated};
use winnow::token::one_of;
use winnow::{ModalResult, Parser};

pub(super) fn number(input: &mut Input) -> ModalResult<Value> {
    alt((float.map(Value::Float), integer.map(Value::Int))).parse_next(input)
}

fn integer(input: &mut Input) -> ModalResult<i64> {
    digit1.try_map(i64::from_str).parse_next(input)
}

fn float(input: &mut Input) -> ModalResult<f64> {
    terminated(digit1, alt((terminated(fraction, opt(exponent)), exponent)))
        .take()
        .try_map(f64::from_str)
        .parse_next(input)
}

fn fraction<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    preceded('.', digit1).parse_next(input)
}

fn exponent<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), cut_err(digit1))
        .take()
        .parse_next(input)
}
