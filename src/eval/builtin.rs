//! The internal functions the type check lowers operators and implicit
//! conversions into.
//!
//! Their names carry the reserved `__builtin_` prefix and are looked up
//! before the user scope. Operator functions receive the operator as their
//! first argument, an int literal holding the `ArithmeticOp` discriminant.

use super::func::{FuncArgs, FuncDef};
use crate::ast::ArithmeticOp;
use crate::value::{Type, Value};

/// Returns the definition of an internal function, if `name` denotes one.
pub(super) fn lookup(name: &str) -> Option<FuncDef> {
    let def = match name {
        "__builtin_int_math" => FuncDef::builder()
            .param(Type::Int)
            .variadic(Type::Int)
            .returns(Type::Int)
            .build(int_math),
        "__builtin_float_math" => FuncDef::builder()
            .param(Type::Int)
            .variadic(Type::Float)
            .returns(Type::Float)
            .build(float_math),
        "__builtin_bool_compare" => FuncDef::builder()
            .params([Type::Int, Type::Bool, Type::Bool])
            .returns(Type::Bool)
            .build(bool_compare),
        "__builtin_int_compare" => FuncDef::builder()
            .params([Type::Int, Type::Int, Type::Int])
            .returns(Type::Bool)
            .build(int_compare),
        "__builtin_float_compare" => FuncDef::builder()
            .params([Type::Int, Type::Float, Type::Float])
            .returns(Type::Bool)
            .build(float_compare),
        "__builtin_string_compare" => FuncDef::builder()
            .params([Type::Int, Type::String, Type::String])
            .returns(Type::Bool)
            .build(string_compare),
        "__builtin_logical" => FuncDef::builder()
            .param(Type::Int)
            .variadic(Type::Bool)
            .returns(Type::Bool)
            .build(logical),
        "__builtin_int_to_float" => FuncDef::builder()
            .param(Type::Int)
            .returns(Type::Float)
            .build(int_to_float),
        "__builtin_float_to_int" => FuncDef::builder()
            .param(Type::Float)
            .returns(Type::Int)
            .build(float_to_int),
        "__builtin_int_to_string" => FuncDef::builder()
            .param(Type::Int)
            .returns(Type::String)
            .build(int_to_string),
        "__builtin_float_to_string" => FuncDef::builder()
            .param(Type::Float)
            .returns(Type::String)
            .build(float_to_string),
        "__builtin_string_to_int" => FuncDef::builder()
            .param(Type::String)
            .returns(Type::Int)
            .build(string_to_int),
        "__builtin_string_to_float" => FuncDef::builder()
            .param(Type::String)
            .returns(Type::Float)
            .build(string_to_float),
        "__builtin_string_to_bool" => FuncDef::builder()
            .param(Type::String)
            .returns(Type::Bool)
            .build(string_to_bool),
        "__builtin_bool_to_string" => FuncDef::builder()
            .param(Type::Bool)
            .returns(Type::String)
            .build(bool_to_string),
        _ => return None,
    };

    Some(def)
}

/// Returns the name of the internal conversion function from `from` to
/// `to`, if the implicit conversion is allowed.
pub(super) fn conversion(from: Type, to: Type) -> Option<&'static str> {
    let name = match (from, to) {
        (Type::Int, Type::Float) => "__builtin_int_to_float",
        (Type::Float, Type::Int) => "__builtin_float_to_int",
        (Type::Int, Type::String) => "__builtin_int_to_string",
        (Type::Float, Type::String) => "__builtin_float_to_string",
        (Type::String, Type::Int) => "__builtin_string_to_int",
        (Type::String, Type::Float) => "__builtin_string_to_float",
        (Type::String, Type::Bool) => "__builtin_string_to_bool",
        (Type::Bool, Type::String) => "__builtin_bool_to_string",
        _ => return None,
    };

    Some(name)
}

fn op_arg(args: &FuncArgs) -> Result<ArithmeticOp, String> {
    match args.first() {
        Some(Value::Int(n)) => {
            ArithmeticOp::from_int(*n).ok_or_else(|| format!("invalid operator: {n}"))
        }
        _ => Err(String::from("missing operator argument")),
    }
}

fn operands(args: &FuncArgs) -> Result<(&Value, &Value), String> {
    match args.positional() {
        [_, lhs, rhs] => Ok((lhs, rhs)),
        _ => Err(String::from("expected exactly two operands")),
    }
}

fn int(value: &Value) -> Result<i64, String> {
    value
        .as_int()
        .ok_or_else(|| format!("expected an int, got {}", Type::of(value)))
}

fn float(value: &Value) -> Result<f64, String> {
    value
        .as_float()
        .ok_or_else(|| format!("expected a float, got {}", Type::of(value)))
}

fn boolean(value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("expected a bool, got {}", Type::of(value)))
}

fn string(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", Type::of(value)))
}

fn int_math(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let mut operands = args.variadic().iter();

    let mut acc = match operands.next() {
        Some(value) => int(value)?,
        None => return Err(String::from("missing operands")),
    };

    for value in operands {
        let rhs = int(value)?;
        acc = match op {
            ArithmeticOp::Add => acc.checked_add(rhs).ok_or("integer overflow")?,
            ArithmeticOp::Sub => acc.checked_sub(rhs).ok_or("integer overflow")?,
            ArithmeticOp::Mul => acc.checked_mul(rhs).ok_or("integer overflow")?,
            ArithmeticOp::Div => {
                if rhs == 0 {
                    return Err(String::from("division by zero"));
                }
                acc.checked_div(rhs).ok_or("integer overflow")?
            }
            ArithmeticOp::Mod => {
                if rhs == 0 {
                    return Err(String::from("modulo by zero"));
                }
                acc.checked_rem(rhs).ok_or("integer overflow")?
            }
            other => return Err(format!("`{other}` is not an int math operator")),
        };
    }

    Ok(Value::Int(acc))
}

fn float_math(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let mut operands = args.variadic().iter();

    let mut acc = match operands.next() {
        Some(value) => float(value)?,
        None => return Err(String::from("missing operands")),
    };

    for value in operands {
        let rhs = float(value)?;
        acc = match op {
            ArithmeticOp::Add => acc + rhs,
            ArithmeticOp::Sub => acc - rhs,
            ArithmeticOp::Mul => acc * rhs,
            // IEEE semantics: dividing by zero produces an infinity.
            ArithmeticOp::Div => acc / rhs,
            other => return Err(format!("`{other}` is not a float math operator")),
        };
    }

    Ok(Value::Float(acc))
}

fn bool_compare(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let (lhs, rhs) = operands(&args)?;
    let (lhs, rhs) = (boolean(lhs)?, boolean(rhs)?);

    let result = match op {
        ArithmeticOp::Equal => lhs == rhs,
        ArithmeticOp::NotEqual => lhs != rhs,
        other => return Err(format!("`{other}` is not a bool comparison operator")),
    };

    Ok(Value::Bool(result))
}

fn int_compare(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let (lhs, rhs) = operands(&args)?;
    let (lhs, rhs) = (int(lhs)?, int(rhs)?);

    let result = match op {
        ArithmeticOp::Equal => lhs == rhs,
        ArithmeticOp::NotEqual => lhs != rhs,
        ArithmeticOp::LessThan => lhs < rhs,
        ArithmeticOp::GreaterThan => lhs > rhs,
        ArithmeticOp::LessThanOrEqual => lhs <= rhs,
        ArithmeticOp::GreaterThanOrEqual => lhs >= rhs,
        other => return Err(format!("`{other}` is not a comparison operator")),
    };

    Ok(Value::Bool(result))
}

fn float_compare(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let (lhs, rhs) = operands(&args)?;
    let (lhs, rhs) = (float(lhs)?, float(rhs)?);

    let result = match op {
        ArithmeticOp::Equal => lhs == rhs,
        ArithmeticOp::NotEqual => lhs != rhs,
        ArithmeticOp::LessThan => lhs < rhs,
        ArithmeticOp::GreaterThan => lhs > rhs,
        ArithmeticOp::LessThanOrEqual => lhs <= rhs,
        ArithmeticOp::GreaterThanOrEqual => lhs >= rhs,
        other => return Err(format!("`{other}` is not a comparison operator")),
    };

    Ok(Value::Bool(result))
}

fn string_compare(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let (lhs, rhs) = operands(&args)?;
    let (lhs, rhs) = (string(lhs)?, string(rhs)?);

    let result = match op {
        ArithmeticOp::Equal => lhs == rhs,
        ArithmeticOp::NotEqual => lhs != rhs,
        other => return Err(format!("`{other}` is not a string comparison operator")),
    };

    Ok(Value::Bool(result))
}

fn logical(args: FuncArgs) -> Result<Value, String> {
    let op = op_arg(&args)?;
    let mut operands = args.variadic().iter();

    let mut acc = match operands.next() {
        Some(value) => boolean(value)?,
        None => return Err(String::from("missing operands")),
    };

    for value in operands {
        let rhs = boolean(value)?;
        acc = match op {
            ArithmeticOp::LogicalAnd => acc && rhs,
            ArithmeticOp::LogicalOr => acc || rhs,
            other => return Err(format!("`{other}` is not a logical operator")),
        };
    }

    Ok(Value::Bool(acc))
}

fn arg(args: &FuncArgs) -> Result<&Value, String> {
    args.first().ok_or_else(|| String::from("missing argument"))
}

fn int_to_float(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::Float(int(arg(&args)?)? as f64))
}

fn float_to_int(args: FuncArgs) -> Result<Value, String> {
    // Truncation towards zero.
    Ok(Value::Int(float(arg(&args)?)? as i64))
}

fn int_to_string(args: FuncArgs) -> Result<Value, String> {
    let n = int(arg(&args)?)?;
    Ok(Value::String(itoa::Buffer::new().format(n).to_owned()))
}

fn float_to_string(args: FuncArgs) -> Result<Value, String> {
    let n = float(arg(&args)?)?;
    Ok(Value::String(ryu::Buffer::new().format(n).to_owned()))
}

fn string_to_int(args: FuncArgs) -> Result<Value, String> {
    let s = string(arg(&args)?)?;
    s.parse()
        .map(Value::Int)
        .map_err(|err| format!("invalid int {s:?}: {err}"))
}

fn string_to_float(args: FuncArgs) -> Result<Value, String> {
    let s = string(arg(&args)?)?;
    s.parse()
        .map(Value::Float)
        .map_err(|err| format!("invalid float {s:?}: {err}"))
}

fn string_to_bool(args: FuncArgs) -> Result<Value, String> {
    match string(arg(&args)?)? {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        other => Err(format!("invalid bool {other:?}")),
    }
}

fn bool_to_string(args: FuncArgs) -> Result<Value, String> {
    let b = boolean(arg(&args)?)?;
    Ok(Value::String(String::from(if b { "true" } else { "false" })))
}
