mod common;

use common::assert_eval;
use indoc::indoc;
use interp::eval::{FuncArgs, FuncDef};
use interp::{Context, Type, Value};
use pretty_assertions::assert_eq;

#[test]
fn literal_templates_render_unchanged() {
    let ctx = Context::new();

    for template in [
        "",
        "plain text",
        "multi\nline\ntext",
        "dollar $ brace } dollar-brace $ {",
    ] {
        assert_eval(&ctx, template, template);
    }
}

#[test]
fn escaped_interpolation_markers() {
    let ctx = Context::new();

    assert_eval(&ctx, "$${escaped}", "${escaped}");
    assert_eval(&ctx, "a $${b} c", "a ${b} c");
}

#[test]
fn multiline_template() {
    fn join(args: FuncArgs) -> Result<Value, String> {
        let sep = match args.positional() {
            [Value::String(sep)] => sep.clone(),
            _ => return Err(String::from("expected a separator")),
        };

        let parts: Vec<&str> = args.variadic().iter().filter_map(Value::as_str).collect();
        Ok(Value::from(parts.join(&sep)))
    }

    let mut ctx = Context::new();
    ctx.define_var("host", "db1");
    ctx.define_var("port", 5432);
    ctx.define_func(
        "join",
        FuncDef::builder()
            .param(Type::String)
            .variadic(Type::String)
            .returns(Type::String)
            .build(join),
    );

    let template = indoc! {r#"
        host = "${host}"
        port = ${port}
        tags = "${join(",", "a", "b")}"
    "#};

    let expected = indoc! {r#"
        host = "db1"
        port = 5432
        tags = "a,b"
    "#};

    assert_eval(&ctx, template, expected);
}

#[test]
fn dotted_variables_resolve() {
    let mut ctx = Context::new();
    ctx.define_var("var.instances.*.id", vec!["i-abc", "i-def"]);
    ctx.define_var("count.index", 0);

    assert_eval(&ctx, "${var.instances.*.id[count.index]}", "i-abc");
}

#[test]
fn parse_errors_report_positions() {
    let err = interp::parse("ok so far\n${ 1 + }").unwrap_err();

    assert_eq!(err.location().line, 2);
    assert_eq!(err.location().col, 8);
    assert_eq!(err.line(), "${ 1 + }");
    assert_eq!(err.offset(), 17);
}

#[test]
fn parse_error_display() {
    let err = interp::parse("${ @ }").unwrap_err();
    let rendered = err.to_string();

    assert!(rendered.contains("--> parse error in line 1, col 4"));
    assert!(rendered.contains("| ${ @ }"));
    assert!(rendered.contains("^---"));
}

#[test]
fn parse_errors_convert_into_the_crate_error() {
    fn render(ctx: &Context, template: &str) -> interp::Result<Value> {
        let node = interp::parse(template)?;
        let result = interp::evaluate(&node, ctx)?;
        Ok(result.into_value())
    }

    let ctx = Context::new();

    assert_eq!(render(&ctx, "2 + 2 = ${2 + 2}"), Ok(Value::from("2 + 2 = 4")));
    assert!(render(&ctx, "${").is_err());
    assert!(render(&ctx, "${missing}").is_err());
}
