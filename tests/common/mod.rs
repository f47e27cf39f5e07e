#![allow(dead_code)]

use interp::eval::{Error, ErrorKind};
use interp::{evaluate, Context, Type, Value};
use pretty_assertions::assert_eq;

#[track_caller]
pub fn assert_eval(ctx: &Context, template: &str, expected: impl Into<Value>) {
    let node = interp::parse(template).unwrap();
    let result = evaluate(&node, ctx).unwrap();
    assert_eq!(
        result.value(),
        &expected.into(),
        "template: {template:?}"
    );
}

#[track_caller]
pub fn assert_eval_ty(ctx: &Context, template: &str, expected: Type) {
    let node = interp::parse(template).unwrap();
    let result = evaluate(&node, ctx).unwrap();
    assert_eq!(result.ty(), expected, "template: {template:?}");
}

#[track_caller]
pub fn eval_error(ctx: &Context, template: &str) -> Error {
    let node = interp::parse(template).unwrap();
    evaluate(&node, ctx).unwrap_err()
}

#[track_caller]
pub fn assert_eval_error(ctx: &Context, template: &str, expected: ErrorKind) {
    let err = eval_error(ctx, template);
    assert_eq!(err.kind(), &expected, "template: {template:?}");
}
