//! The pre-evaluation passes.
//!
//! `check_identifiers` verifies that every referenced variable and function
//! resolves against the scope and that call arities match. `check_types`
//! assigns a static type to every node and returns a rewritten tree in
//! which operators are lowered into internal function calls and implicit
//! conversions are inserted as calls around the converted operands. The
//! input tree is never mutated.

use super::builtin;
use super::error::{Error, ErrorKind, EvalResult};
use super::{Scope, SemanticCheck};
use crate::ast::{
    Arithmetic, ArithmeticOp, Conditional, FuncCall, Index, Literal, Location, Node, Output,
};
use crate::value::{Type, Value};

pub(super) fn check_identifiers<S>(
    node: &Node,
    scope: &S,
    checks: &[SemanticCheck],
) -> EvalResult<()>
where
    S: Scope + ?Sized,
{
    node.walk(&mut |node: &Node| {
        match node {
            Node::Variable(var) => {
                if scope.lookup_var(&var.name).is_none() {
                    return Err(Error::located(
                        ErrorKind::UndefinedVariable(var.name.clone()),
                        var.location,
                    ));
                }
            }
            Node::Call(call) => check_call_target(call, scope)?,
            _ => {}
        }

        for check in checks {
            check(node).map_err(|msg| Error::located(ErrorKind::Message(msg), node.location()))?;
        }

        Ok(())
    })
}

fn check_call_target<S>(call: &FuncCall, scope: &S) -> EvalResult<()>
where
    S: Scope + ?Sized,
{
    let (expected, variadic) = match builtin::lookup(&call.name) {
        Some(def) => (def.params().len(), def.variadic().is_some()),
        None => match scope.lookup_func(&call.name) {
            Some(def) => (def.params().len(), def.variadic().is_some()),
            None => {
                return Err(Error::located(
                    ErrorKind::UndefinedFunction(call.name.clone()),
                    call.location,
                ));
            }
        },
    };

    let given = call.args.len();
    if given < expected || (!variadic && given > expected) {
        return Err(Error::located(
            ErrorKind::Arity {
                name: call.name.clone(),
                expected,
                variadic,
                given,
            },
            call.location,
        ));
    }

    Ok(())
}

/// Checks the tree bottom-up, returning the rewritten tree and its type.
///
/// A result type of `Type::Unknown` means some input of the subtree is not
/// computable yet; checking of the enclosing nodes is skipped and the
/// unknown propagates to the root.
pub(super) fn check_types<S>(node: &Node, scope: &S) -> EvalResult<(Node, Type)>
where
    S: Scope + ?Sized,
{
    match node {
        Node::Literal(lit) => Ok((node.clone(), Type::of(&lit.value))),
        Node::Variable(var) => {
            let value = scope.lookup_var(&var.name).ok_or_else(|| {
                Error::located(ErrorKind::UndefinedVariable(var.name.clone()), var.location)
            })?;
            Ok((node.clone(), Type::of(value)))
        }
        Node::Arithmetic(arith) => check_arithmetic(arith, scope),
        Node::Call(call) => check_call(call, scope),
        Node::Conditional(cond) => check_conditional(cond, scope),
        Node::Index(index) => check_index(index, scope),
        Node::Output(output) => check_output(output, scope),
    }
}

fn check_arithmetic<S>(arith: &Arithmetic, scope: &S) -> EvalResult<(Node, Type)>
where
    S: Scope + ?Sized,
{
    let mut exprs = Vec::with_capacity(arith.exprs.len());
    let mut types = Vec::with_capacity(arith.exprs.len());

    for expr in &arith.exprs {
        let (expr, ty) = check_types(expr, scope)?;
        exprs.push(expr);
        types.push(ty);
    }

    if types.contains(&Type::Unknown) {
        let node = Node::Arithmetic(Arithmetic {
            op: arith.op,
            exprs,
            location: arith.location,
        });
        return Ok((node, Type::Unknown));
    }

    match arith.op {
        ArithmeticOp::Add
        | ArithmeticOp::Sub
        | ArithmeticOp::Mul
        | ArithmeticOp::Div
        | ArithmeticOp::Mod => check_math(arith.op, arith.location, exprs, types),
        ArithmeticOp::LogicalAnd | ArithmeticOp::LogicalOr => {
            check_logical(arith.op, arith.location, exprs, types)
        }
        _ => check_comparison(arith.op, arith.location, exprs, types),
    }
}

fn check_math(
    op: ArithmeticOp,
    location: Location,
    exprs: Vec<Node>,
    types: Vec<Type>,
) -> EvalResult<(Node, Type)> {
    let family = if types.contains(&Type::Float) {
        Type::Float
    } else {
        Type::Int
    };

    // Modulo is an int-only operation.
    if op == ArithmeticOp::Mod && family == Type::Float {
        return Err(Error::located(
            ErrorKind::TypeMismatch {
                expected: Type::Int,
                actual: Type::Float,
            },
            location,
        ));
    }

    let name = if family == Type::Float {
        "__builtin_float_math"
    } else {
        "__builtin_int_math"
    };

    let node = lowered_call(name, op, location, exprs, types, family)?;
    Ok((node, family))
}

fn check_logical(
    op: ArithmeticOp,
    location: Location,
    exprs: Vec<Node>,
    types: Vec<Type>,
) -> EvalResult<(Node, Type)> {
    let node = lowered_call("__builtin_logical", op, location, exprs, types, Type::Bool)?;
    Ok((node, Type::Bool))
}

fn check_comparison(
    op: ArithmeticOp,
    location: Location,
    exprs: Vec<Node>,
    types: Vec<Type>,
) -> EvalResult<(Node, Type)> {
    let ordering = matches!(
        op,
        ArithmeticOp::LessThan
            | ArithmeticOp::GreaterThan
            | ArithmeticOp::LessThanOrEqual
            | ArithmeticOp::GreaterThanOrEqual
    );

    // Ordering comparisons are numeric; equality follows the type of the
    // first operand.
    let family = if ordering {
        if types.contains(&Type::Float) {
            Type::Float
        } else {
            Type::Int
        }
    } else {
        match types.first().copied() {
            Some(ty @ (Type::Bool | Type::Int | Type::Float | Type::String)) => ty,
            Some(ty) => {
                return Err(Error::located(
                    ErrorKind::Unexpected(ty, "a bool, int, float or string"),
                    location,
                ));
            }
            None => {
                return Err(Error::located(
                    ErrorKind::Message(String::from("comparison without operands")),
                    location,
                ));
            }
        }
    };

    let name = match family {
        Type::Bool => "__builtin_bool_compare",
        Type::Float => "__builtin_float_compare",
        Type::String => "__builtin_string_compare",
        _ => "__builtin_int_compare",
    };

    let node = lowered_call(name, op, location, exprs, types, family)?;
    Ok((node, Type::Bool))
}

/// Lowers an operator application into a call to an internal function. The
/// operator travels as the first argument; all operands are converted
/// towards `operand_ty`.
fn lowered_call(
    name: &str,
    op: ArithmeticOp,
    location: Location,
    exprs: Vec<Node>,
    types: Vec<Type>,
    operand_ty: Type,
) -> EvalResult<Node> {
    let mut args = Vec::with_capacity(exprs.len() + 1);
    args.push(Node::Literal(Literal {
        value: Value::Int(op.as_int()),
        location,
    }));

    for (expr, ty) in exprs.into_iter().zip(types) {
        args.push(coerce(expr, ty, operand_ty)?);
    }

    Ok(Node::Call(FuncCall {
        name: name.to_owned(),
        args,
        location,
    }))
}

/// Converts `node` from type `from` to type `to` by wrapping it into a call
/// to the matching conversion function. Fails with `TypeMismatch` if no
/// implicit conversion exists.
fn coerce(node: Node, from: Type, to: Type) -> EvalResult<Node> {
    if from == to || to == Type::Any {
        return Ok(node);
    }

    let location = node.location();

    let name = builtin::conversion(from, to).ok_or_else(|| {
        Error::located(
            ErrorKind::TypeMismatch {
                expected: to,
                actual: from,
            },
            location,
        )
    })?;

    // Conversions of literals fold right away, so impossible ones surface
    // here instead of at evaluation time.
    if let Node::Literal(lit) = &node {
        if let Some(def) = builtin::lookup(name) {
            return match def.call(vec![lit.value.clone()]) {
                Ok(value) => Ok(Node::Literal(Literal { value, location })),
                Err(_) => Err(Error::located(
                    ErrorKind::TypeMismatch {
                        expected: to,
                        actual: from,
                    },
                    location,
                )),
            };
        }
    }

    Ok(Node::Call(FuncCall {
        name: name.to_owned(),
        args: vec![node],
        location,
    }))
}

fn check_call<S>(call: &FuncCall, scope: &S) -> EvalResult<(Node, Type)>
where
    S: Scope + ?Sized,
{
    let (params, variadic, ret) = match builtin::lookup(&call.name) {
        Some(def) => (def.params().to_vec(), def.variadic(), def.return_type()),
        None => match scope.lookup_func(&call.name) {
            Some(def) => (def.params().to_vec(), def.variadic(), def.return_type()),
            None => {
                return Err(Error::located(
                    ErrorKind::UndefinedFunction(call.name.clone()),
                    call.location,
                ));
            }
        },
    };

    let given = call.args.len();
    if given < params.len() || (variadic.is_none() && given > params.len()) {
        return Err(Error::located(
            ErrorKind::Arity {
                name: call.name.clone(),
                expected: params.len(),
                variadic: variadic.is_some(),
                given,
            },
            call.location,
        ));
    }

    let mut checked = Vec::with_capacity(given);
    let mut unknown = false;

    for arg in &call.args {
        let (arg, ty) = check_types(arg, scope)?;
        unknown = unknown || ty == Type::Unknown;
        checked.push((arg, ty));
    }

    if unknown {
        let args = checked.into_iter().map(|(arg, _)| arg).collect();
        let node = Node::Call(FuncCall {
            name: call.name.clone(),
            args,
            location: call.location,
        });
        return Ok((node, Type::Unknown));
    }

    let mut args = Vec::with_capacity(given);
    for (pos, (arg, ty)) in checked.into_iter().enumerate() {
        let want = params.get(pos).copied().or(variadic).unwrap_or(Type::Any);
        args.push(coerce(arg, ty, want)?);
    }

    let node = Node::Call(FuncCall {
        name: call.name.clone(),
        args,
        location: call.location,
    });
    Ok((node, ret))
}

fn check_conditional<S>(cond: &Conditional, scope: &S) -> EvalResult<(Node, Type)>
where
    S: Scope + ?Sized,
{
    let (cond_expr, cond_ty) = check_types(&cond.cond, scope)?;
    let (true_expr, true_ty) = check_types(&cond.true_expr, scope)?;
    let (false_expr, false_ty) = check_types(&cond.false_expr, scope)?;

    if cond_ty == Type::Unknown || true_ty == Type::Unknown || false_ty == Type::Unknown {
        let node = Node::Conditional(Conditional {
            cond: Box::new(cond_expr),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
            location: cond.location,
        });
        return Ok((node, Type::Unknown));
    }

    for ty in [true_ty, false_ty] {
        if matches!(ty, Type::List | Type::Map) {
            return Err(Error::located(
                ErrorKind::UnsupportedConditionalType(ty),
                cond.location,
            ));
        }
    }

    let cond_expr = coerce(cond_expr, cond_ty, Type::Bool)?;

    // Branch reconciliation is asymmetric: a string true branch defers to
    // the false branch's type, otherwise the false branch is converted
    // towards the true branch.
    let (true_expr, false_expr, ty) = if true_ty == false_ty {
        (true_expr, false_expr, true_ty)
    } else if true_ty == Type::String {
        (coerce(true_expr, true_ty, false_ty)?, false_expr, false_ty)
    } else {
        (true_expr, coerce(false_expr, false_ty, true_ty)?, true_ty)
    };

    let node = Node::Conditional(Conditional {
        cond: Box::new(cond_expr),
        true_expr: Box::new(true_expr),
        false_expr: Box::new(false_expr),
        location: cond.location,
    });
    Ok((node, ty))
}

fn check_index<S>(index: &Index, scope: &S) -> EvalResult<(Node, Type)>
where
    S: Scope + ?Sized,
{
    let var = match index.target.as_ref() {
        Node::Variable(var) => var,
        _ => {
            return Err(Error::located(
                ErrorKind::UnsupportedIndexTarget,
                index.location,
            ));
        }
    };

    let (key, key_ty) = check_types(&index.key, scope)?;

    let value = scope.lookup_var(&var.name).ok_or_else(|| {
        Error::located(ErrorKind::UndefinedVariable(var.name.clone()), var.location)
    })?;

    if key_ty == Type::Unknown || value.is_unknown() {
        let node = Node::Index(Index {
            target: index.target.clone(),
            key: Box::new(key),
            location: index.location,
        });
        return Ok((node, Type::Unknown));
    }

    let (key, element_ty) = match value {
        Value::List(items) => (
            coerce(key, key_ty, Type::Int)?,
            element_type(&var.name, items.iter(), index.location)?,
        ),
        Value::Map(map) => (
            coerce(key, key_ty, Type::String)?,
            element_type(&var.name, map.values(), index.location)?,
        ),
        other => {
            return Err(Error::located(
                ErrorKind::Unexpected(Type::of(other), "a list or map"),
                var.location,
            ));
        }
    };

    let node = Node::Index(Index {
        target: index.target.clone(),
        key: Box::new(key),
        location: index.location,
    });
    Ok((node, element_ty))
}

/// Determines the common element type of a collection.
///
/// Empty collections and collections containing unknown elements have no
/// static element type; indexing them resolves at evaluation time, so the
/// result is `Type::Unknown`. Mixing two known element types is an error.
pub(super) fn element_type<'a>(
    name: &str,
    values: impl Iterator<Item = &'a Value>,
    location: Location,
) -> EvalResult<Type> {
    let mut element_ty = None;
    let mut unknown = false;

    for value in values {
        let ty = Type::of(value);
        if ty == Type::Unknown {
            unknown = true;
            continue;
        }

        match element_ty {
            None => element_ty = Some(ty),
            Some(expected) if expected != ty => {
                return Err(Error::located(
                    ErrorKind::HeterogeneousCollection {
                        name: name.to_owned(),
                        expected,
                        actual: ty,
                    },
                    location,
                ));
            }
            Some(_) => {}
        }
    }

    match element_ty {
        Some(ty) if !unknown => Ok(ty),
        _ => Ok(Type::Unknown),
    }
}

fn check_output<S>(output: &Output, scope: &S) -> EvalResult<(Node, Type)>
where
    S: Scope + ?Sized,
{
    let mut checked = Vec::with_capacity(output.exprs.len());
    let mut unknown = false;

    for expr in &output.exprs {
        let (expr, ty) = check_types(expr, scope)?;
        unknown = unknown || ty == Type::Unknown;
        checked.push((expr, ty));
    }

    if unknown {
        let exprs = checked.into_iter().map(|(expr, _)| expr).collect();
        let node = Node::Output(Output {
            exprs,
            location: output.location,
        });
        return Ok((node, Type::Unknown));
    }

    // A template that is exactly one interpolation may produce a whole
    // collection instead of a string.
    if checked.len() == 1 && matches!(checked[0].1, Type::List | Type::Map) {
        let ty = checked[0].1;
        let exprs = checked.into_iter().map(|(expr, _)| expr).collect();
        let node = Node::Output(Output {
            exprs,
            location: output.location,
        });
        return Ok((node, ty));
    }

    let mut exprs = Vec::with_capacity(checked.len());
    for (expr, ty) in checked {
        exprs.push(coerce(expr, ty, Type::String)?);
    }

    let node = Node::Output(Output {
        exprs,
        location: output.location,
    });
    Ok((node, Type::String))
}
