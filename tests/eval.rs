mod common;

use common::{assert_eval, assert_eval_error, assert_eval_ty, eval_error};
use interp::ast::{Literal, Node};
use interp::eval::{ErrorKind, FuncArgs, FuncDef};
use interp::{evaluate, evaluate_with_checks, Context, Map, Type, Value};
use pretty_assertions::assert_eq;

fn replace(args: FuncArgs) -> Result<Value, String> {
    match args.positional() {
        [Value::String(s), Value::String(from), Value::String(to)] => {
            Ok(Value::from(s.replace(from.as_str(), to.as_str())))
        }
        _ => Err(String::from("expected three string arguments")),
    }
}

fn upper(args: FuncArgs) -> Result<Value, String> {
    match args.first() {
        Some(Value::String(s)) => Ok(Value::from(s.to_uppercase())),
        _ => Err(String::from("expected a string argument")),
    }
}

fn fail(_: FuncArgs) -> Result<Value, String> {
    Err(String::from("boom"))
}

fn replace_def() -> FuncDef {
    FuncDef::builder()
        .params([Type::String, Type::String, Type::String])
        .returns(Type::String)
        .build(replace)
}

#[test]
fn literal_templates() {
    let ctx = Context::new();

    assert_eval(&ctx, "", "");
    assert_eval(&ctx, "foo bar", "foo bar");
    assert_eval(&ctx, "$${a}", "${a}");
    assert_eval_ty(&ctx, "", Type::String);
}

#[test]
fn variable_interpolation() {
    let mut ctx = Context::new();
    ctx.define_var("name", "world");
    ctx.define_var("count", 2);

    assert_eval(&ctx, "Hello, ${name}!", "Hello, world!");
    assert_eval(&ctx, "${count} + ${count}", "2 + 2");
}

#[test]
fn dotted_variable_names() {
    let mut ctx = Context::new();
    ctx.define_var("var.foo.*.id", vec!["i-1", "i-2"]);

    assert_eval_ty(&ctx, "${var.foo.*.id}", Type::List);
    assert_eval(&ctx, "${var.foo.*.id[1]}", "i-2");
}

#[test]
fn unknown_propagation() {
    let mut ctx = Context::new();
    ctx.define_var("pending", Value::Unknown);
    ctx.define_var("known", 1);
    ctx.define_func("up", FuncDef::builder().param(Type::String).build(upper));
    ctx.define_func(
        "explode",
        FuncDef::builder().param(Type::Any).build(fail),
    );

    for template in [
        "${pending}",
        "${pending + known}",
        "${pending ? 1 : 2}",
        "${up(pending)}",
        "prefix ${pending} suffix",
        // Unknown arguments bypass the callback entirely.
        "${explode(pending)}",
    ] {
        assert_eval(&ctx, template, Value::Unknown);
        assert_eval_ty(&ctx, template, Type::Unknown);
    }
}

#[test]
fn int_arithmetic() {
    let ctx = Context::new();

    assert_eval(&ctx, "${1 + 2 + 3}", "6");
    assert_eval(&ctx, "${2 * 3 - 1}", "5");
    assert_eval(&ctx, "${10 / 3}", "3");
    assert_eval(&ctx, "${7 % 3}", "1");
    assert_eval(&ctx, "${-4}", "-4");
    assert_eval(&ctx, "${1 + 2 * 3}", "7");
    assert_eval(&ctx, "${(1 + 2) * 3}", "9");
}

#[test]
fn float_arithmetic() {
    let ctx = Context::new();

    assert_eval(&ctx, "${1.5 + 1.5}", "3.0");
    assert_eval(&ctx, "${2 + 2.5}", "4.5");
    assert_eval(&ctx, "${10.0 / 4}", "2.5");
}

#[test]
fn numeric_string_conversions() {
    let ctx = Context::new();

    assert_eval(&ctx, "${1 + \"2\"}", "3");
    assert_eval(&ctx, "${\"1.5\" + 1.5}", "3.0");
}

#[test]
fn type_mismatch_is_a_check_error() {
    let ctx = Context::new();

    assert_eval_error(
        &ctx,
        "${1 + \"x\"}",
        ErrorKind::TypeMismatch {
            expected: Type::Int,
            actual: Type::String,
        },
    );
    assert_eval_error(
        &ctx,
        "${1 + true}",
        ErrorKind::TypeMismatch {
            expected: Type::Int,
            actual: Type::Bool,
        },
    );
    // Modulo is int-only.
    assert_eval_error(
        &ctx,
        "${1.5 % 2}",
        ErrorKind::TypeMismatch {
            expected: Type::Int,
            actual: Type::Float,
        },
    );
}

#[test]
fn int_math_failures() {
    let mut ctx = Context::new();
    ctx.define_var("big", i64::MAX);

    assert_eval_error(
        &ctx,
        "${1 / 0}",
        ErrorKind::FuncCall(
            String::from("__builtin_int_math"),
            String::from("division by zero"),
        ),
    );
    assert_eval_error(
        &ctx,
        "${big + 1}",
        ErrorKind::FuncCall(
            String::from("__builtin_int_math"),
            String::from("integer overflow"),
        ),
    );
}

#[test]
fn comparisons() {
    let mut ctx = Context::new();
    ctx.define_var("a", "hello");

    assert_eval(&ctx, "${1 < 2 ? \"y\" : \"n\"}", "y");
    assert_eval(&ctx, "${2 <= 2 ? \"y\" : \"n\"}", "y");
    assert_eval(&ctx, "${1.5 > 1 ? \"y\" : \"n\"}", "y");
    assert_eval(&ctx, "${a == \"hello\" ? 1 : 0}", "1");
    assert_eval(&ctx, "${a != \"hello\" ? 1 : 0}", "0");
    assert_eval(&ctx, "${true != false ? \"y\" : \"n\"}", "y");
    // String operands of an ordering comparison convert to numbers.
    assert_eval(&ctx, "${\"10\" > 9 ? \"y\" : \"n\"}", "y");
}

#[test]
fn logical_operators() {
    let ctx = Context::new();

    assert_eval(&ctx, "${true && false}", "false");
    assert_eval(&ctx, "${true || false}", "true");
    assert_eval(&ctx, "${\"true\" && true}", "true");
    assert_eval(&ctx, "${!true}", "false");
    assert_eval(&ctx, "${!false || false}", "true");
}

#[test]
fn conditionals() {
    let mut ctx = Context::new();
    ctx.define_var("yes", true);
    ctx.define_var("no", false);

    assert_eval(&ctx, "${yes ? \"a\" : \"b\"}", "a");
    assert_eval(&ctx, "${no ? \"a\" : \"b\"}", "b");
    // The condition converts towards bool.
    assert_eval(&ctx, "${\"true\" ? 1 : 2}", "1");
    // A string true branch defers to the false branch's type.
    assert_eval(&ctx, "${no ? \"1\" : 2}", "2");
    assert_eval(&ctx, "${yes ? \"1\" : 2}", "1");
}

#[test]
fn conditional_branches_evaluate_eagerly() {
    let mut ctx = Context::new();
    ctx.define_var("yes", true);

    // The untaken branch still runs.
    assert_eval_error(
        &ctx,
        "${yes ? 1 : 1 / 0}",
        ErrorKind::FuncCall(
            String::from("__builtin_int_math"),
            String::from("division by zero"),
        ),
    );
}

#[test]
fn conditional_type_errors() {
    let mut ctx = Context::new();
    ctx.define_var("l", vec![1, 2]);

    assert_eval_error(
        &ctx,
        "${true ? l : l}",
        ErrorKind::UnsupportedConditionalType(Type::List),
    );
    assert_eval_error(
        &ctx,
        "${1 ? 2 : 3}",
        ErrorKind::TypeMismatch {
            expected: Type::Bool,
            actual: Type::Int,
        },
    );
}

#[test]
fn list_indexing() {
    let mut ctx = Context::new();
    ctx.define_var("l", vec!["x", "y"]);

    assert_eval(&ctx, "${l[0]}", "x");
    assert_eval(&ctx, "${l[1]}", "y");
    assert_eval(&ctx, "item: ${l[1]}", "item: y");
    assert_eval_ty(&ctx, "${l[0]}", Type::String);

    assert_eval_error(
        &ctx,
        "${l[5]}",
        ErrorKind::IndexOutOfBounds {
            index: 5,
            length: 2,
        },
    );
    assert_eval_error(
        &ctx,
        "${l[-1]}",
        ErrorKind::IndexOutOfBounds {
            index: -1,
            length: 2,
        },
    );
}

#[test]
fn map_indexing() {
    let mut ctx = Context::new();
    let mut m = Map::new();
    m.insert(String::from("k"), Value::from("v"));
    ctx.define_var("m", m);

    assert_eval(&ctx, "${m[\"k\"]}", "v");
    assert_eval_error(&ctx, "${m[\"z\"]}", ErrorKind::NoSuchKey(String::from("z")));
}

#[test]
fn collection_passthrough() {
    let mut ctx = Context::new();
    ctx.define_var("l", vec![1, 2]);
    let mut m = Map::new();
    m.insert(String::from("k"), Value::Int(1));
    ctx.define_var("m", m);

    assert_eval(&ctx, "${l}", vec![1, 2]);
    assert_eval_ty(&ctx, "${l}", Type::List);
    assert_eval_ty(&ctx, "${m}", Type::Map);

    // Collections cannot be part of a concatenated output.
    assert_eval_error(
        &ctx,
        "x ${l}",
        ErrorKind::TypeMismatch {
            expected: Type::String,
            actual: Type::List,
        },
    );
}

#[test]
fn heterogeneous_collections() {
    let mut ctx = Context::new();
    ctx.define_var("l", vec![Value::Int(1), Value::from("x")]);

    assert_eval_error(
        &ctx,
        "${l[0]}",
        ErrorKind::HeterogeneousCollection {
            name: String::from("l"),
            expected: Type::Int,
            actual: Type::String,
        },
    );
}

#[test]
fn empty_and_unknown_collections() {
    let mut ctx = Context::new();
    ctx.define_var("empty", Vec::<Value>::new());
    ctx.define_var("pending", vec![Value::Unknown]);

    assert_eval_error(
        &ctx,
        "${empty[0]}",
        ErrorKind::EmptyCollection(String::from("empty")),
    );
    // A collection of unknowns indexes to unknown.
    assert_eval(&ctx, "${pending[0]}", Value::Unknown);
}

#[test]
fn index_target_must_be_a_variable() {
    let mut ctx = Context::new();
    ctx.define_func(
        "things",
        FuncDef::builder().returns(Type::List).build(|_| {
            Ok(Value::from(vec!["x"]))
        }),
    );

    assert_eval_error(&ctx, "${things()[0]}", ErrorKind::UnsupportedIndexTarget);
}

#[test]
fn function_calls() {
    let mut ctx = Context::new();
    ctx.define_var("a", "hello");
    ctx.define_func("replace", replace_def());

    assert_eval(&ctx, "${replace(a, \"ello\", \"i\")}", "hi");
    // Arguments convert towards the declared parameter types.
    assert_eval(&ctx, "${replace(4, \"4\", \"2\")}", "2");
}

#[test]
fn function_call_errors() {
    let mut ctx = Context::new();
    ctx.define_var("a", "hello");
    ctx.define_func("replace", replace_def());
    ctx.define_func("explode", FuncDef::builder().build(fail));

    assert_eval_error(
        &ctx,
        "${replace(a)}",
        ErrorKind::Arity {
            name: String::from("replace"),
            expected: 3,
            variadic: false,
            given: 1,
        },
    );
    assert_eval_error(
        &ctx,
        "${nope()}",
        ErrorKind::UndefinedFunction(String::from("nope")),
    );
    assert_eval_error(
        &ctx,
        "${missing}",
        ErrorKind::UndefinedVariable(String::from("missing")),
    );
    assert_eval_error(
        &ctx,
        "${explode()}",
        ErrorKind::FuncCall(String::from("explode"), String::from("boom")),
    );
}

#[test]
fn dishonored_return_types_surface_at_output() {
    fn lie(_: FuncArgs) -> Result<Value, String> {
        Ok(Value::Int(1))
    }

    let mut ctx = Context::new();
    ctx.define_func("version", FuncDef::builder().returns(Type::String).build(lie));

    // The check trusts the declared return type; the runtime value is only
    // caught when the output is assembled.
    assert_eval_error(
        &ctx,
        "x ${version()}",
        ErrorKind::NonStringOutput(Type::Int),
    );
}

#[test]
fn variadic_functions() {
    fn join(args: FuncArgs) -> Result<Value, String> {
        let sep = match args.positional() {
            [Value::String(sep)] => sep.clone(),
            _ => return Err(String::from("expected a separator")),
        };

        let parts: Vec<&str> = args.variadic().iter().filter_map(Value::as_str).collect();
        Ok(Value::from(parts.join(&sep)))
    }

    let mut ctx = Context::new();
    ctx.define_func(
        "join",
        FuncDef::builder()
            .param(Type::String)
            .variadic(Type::String)
            .returns(Type::String)
            .build(join),
    );

    assert_eval(&ctx, "${join(\", \", \"a\", \"b\", \"c\")}", "a, b, c");
    assert_eval(&ctx, "${join(\"-\")}", "");
}

#[test]
fn nested_string_templates() {
    let mut ctx = Context::new();
    ctx.define_var("name", "world");
    ctx.define_func(
        "up",
        FuncDef::builder()
            .param(Type::String)
            .returns(Type::String)
            .build(upper),
    );

    assert_eval(&ctx, "${\"${name}\"}", "world");
    assert_eval(&ctx, "${up(\"${name}!\")}", "WORLD!");
    assert_eval(&ctx, "${\"$${name}\"}", "${name}");
}

#[test]
fn semantic_checks() {
    fn no_calls(node: &Node) -> Result<(), String> {
        match node {
            Node::Call(call) if call.name == "forbidden" => {
                Err(format!("function `{}` is not allowed", call.name))
            }
            _ => Ok(()),
        }
    }

    let mut ctx = Context::new();
    ctx.define_var("a", 1);
    ctx.define_func("forbidden", FuncDef::builder().build(fail));

    let node = interp::parse("${a}").unwrap();
    assert!(evaluate_with_checks(&node, &ctx, &[no_calls]).is_ok());

    let node = interp::parse("${forbidden()}").unwrap();
    let err = evaluate_with_checks(&node, &ctx, &[no_calls]).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::Message(String::from("function `forbidden` is not allowed")),
    );
}

#[test]
fn non_template_roots() {
    let ctx = Context::new();

    let node = Node::Literal(Literal::new(true));
    let result = node.evaluate(&ctx).unwrap();
    assert_eq!(result.ty(), Type::Bool);
    assert_eq!(result.value(), &Value::Bool(true));
}

#[test]
fn errors_carry_positions() {
    let ctx = Context::new();

    let err = eval_error(&ctx, "line one\n${missing}");
    let location = err.location().unwrap();
    assert_eq!(location.line, 2);
    assert_eq!(location.col, 3);
}

#[test]
fn evaluation_does_not_consume_the_tree() {
    let mut ctx = Context::new();
    ctx.define_var("n", 20);

    let node = interp::parse("${n + 1}").unwrap();
    let first = evaluate(&node, &ctx).unwrap();
    let second = evaluate(&node, &ctx).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.value(), &Value::from("21"));

    // A different scope against the same tree.
    ctx.define_var("n", 41);
    let third = evaluate(&node, &ctx).unwrap();
    assert_eq!(third.value(), &Value::from("42"));
}
