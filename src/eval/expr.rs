//! The tree-walking evaluator.
//!
//! Operates on trees rewritten by the type check: operator nodes have been
//! lowered into internal function calls and implicit conversions inserted.
//! Unknown values short-circuit every operation into a successful unknown
//! result.

use super::error::{Error, ErrorKind, EvalResult};
use super::{builtin, check, Scope};
use crate::ast::{Arithmetic, Conditional, FuncCall, Index, Node, Output};
use crate::value::{Type, Value};

pub(super) fn eval<S>(node: &Node, scope: &S) -> EvalResult<Value>
where
    S: Scope + ?Sized,
{
    match node {
        Node::Literal(lit) => Ok(lit.value.clone()),
        Node::Variable(var) => scope.lookup_var(&var.name).cloned().ok_or_else(|| {
            Error::located(ErrorKind::UndefinedVariable(var.name.clone()), var.location)
        }),
        Node::Call(call) => eval_call(call, scope),
        Node::Conditional(cond) => eval_conditional(cond, scope),
        Node::Index(index) => eval_index(index, scope),
        Node::Output(output) => eval_output(output, scope),
        Node::Arithmetic(arith) => eval_arithmetic(arith, scope),
    }
}

// Operator nodes are lowered into calls by the type check; the only ones
// reaching the evaluator are those whose operands were still unknown at
// check time.
fn eval_arithmetic<S>(arith: &Arithmetic, scope: &S) -> EvalResult<Value>
where
    S: Scope + ?Sized,
{
    for expr in &arith.exprs {
        if eval(expr, scope)?.is_unknown() {
            return Ok(Value::Unknown);
        }
    }

    Err(Error::located(
        ErrorKind::Message(format!(
            "operator `{}` has not been lowered; run the type check first",
            arith.op
        )),
        arith.location,
    ))
}

fn eval_call<S>(call: &FuncCall, scope: &S) -> EvalResult<Value>
where
    S: Scope + ?Sized,
{
    let mut values = Vec::with_capacity(call.args.len());

    for arg in &call.args {
        values.push(eval(arg, scope)?);
    }

    // Unknown arguments bypass the callback entirely.
    if values.iter().any(Value::is_unknown) {
        return Ok(Value::Unknown);
    }

    let result = match builtin::lookup(&call.name) {
        Some(def) => def.call(values),
        None => match scope.lookup_func(&call.name) {
            Some(def) => def.call(values),
            None => {
                return Err(Error::located(
                    ErrorKind::UndefinedFunction(call.name.clone()),
                    call.location,
                ));
            }
        },
    };

    result.map_err(|msg| Error::located(ErrorKind::FuncCall(call.name.clone(), msg), call.location))
}

fn eval_conditional<S>(cond: &Conditional, scope: &S) -> EvalResult<Value>
where
    S: Scope + ?Sized,
{
    // Both branches evaluate before one is selected.
    let chosen = eval(&cond.cond, scope)?;
    let true_value = eval(&cond.true_expr, scope)?;
    let false_value = eval(&cond.false_expr, scope)?;

    match chosen {
        Value::Unknown => Ok(Value::Unknown),
        Value::Bool(true) => Ok(true_value),
        Value::Bool(false) => Ok(false_value),
        other => Err(Error::located(
            ErrorKind::Unexpected(Type::of(&other), "a bool"),
            cond.cond.location(),
        )),
    }
}

fn eval_index<S>(index: &Index, scope: &S) -> EvalResult<Value>
where
    S: Scope + ?Sized,
{
    let target = eval(&index.target, scope)?;
    let key = eval(&index.key, scope)?;

    if target.is_unknown() || key.is_unknown() {
        return Ok(Value::Unknown);
    }

    let name = match index.target.as_ref() {
        Node::Variable(var) => var.name.as_str(),
        _ => "expression",
    };

    match target {
        Value::List(items) => {
            let i = key.as_int().ok_or_else(|| {
                Error::located(
                    ErrorKind::Unexpected(Type::of(&key), "an int key"),
                    index.location,
                )
            })?;

            if items.is_empty() {
                return Err(Error::located(
                    ErrorKind::EmptyCollection(name.to_owned()),
                    index.location,
                ));
            }

            // Homogeneity is verified lazily, at the time of the access.
            check::element_type(name, items.iter(), index.location)?;

            usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| {
                    Error::located(
                        ErrorKind::IndexOutOfBounds {
                            index: i,
                            length: items.len(),
                        },
                        index.location,
                    )
                })
        }
        Value::Map(map) => {
            let k = key.as_str().ok_or_else(|| {
                Error::located(
                    ErrorKind::Unexpected(Type::of(&key), "a string key"),
                    index.location,
                )
            })?;

            if map.is_empty() {
                return Err(Error::located(
                    ErrorKind::EmptyCollection(name.to_owned()),
                    index.location,
                ));
            }

            check::element_type(name, map.values(), index.location)?;

            map.get(k)
                .cloned()
                .ok_or_else(|| Error::located(ErrorKind::NoSuchKey(k.to_owned()), index.location))
        }
        other => Err(Error::located(
            ErrorKind::Unexpected(Type::of(&other), "a list or map"),
            index.location,
        )),
    }
}

fn eval_output<S>(output: &Output, scope: &S) -> EvalResult<Value>
where
    S: Scope + ?Sized,
{
    let mut values = Vec::with_capacity(output.exprs.len());

    for expr in &output.exprs {
        values.push(eval(expr, scope)?);
    }

    if values.iter().any(Value::is_unknown) {
        return Ok(Value::Unknown);
    }

    // A single collection fragment passes through untouched.
    if values.len() == 1 && matches!(values[0], Value::List(_) | Value::Map(_)) {
        return Ok(values.remove(0));
    }

    let mut result = String::new();
    for value in values {
        match value {
            Value::String(s) => result.push_str(&s),
            other => {
                return Err(Error::located(
                    ErrorKind::NonStringOutput(Type::of(&other)),
                    output.location,
                ));
            }
        }
    }

    Ok(Value::String(result))
}
