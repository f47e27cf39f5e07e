use super::number::number;
use super::string::{cut_char, ident, quoted};
use super::{located, ws, Input};
use crate::ast::{
    Arithmetic, ArithmeticOp, Conditional, FuncCall, Index, Literal, Node, VariableExpr,
};
use crate::value::Value;
use winnow::combinator::{
    alt, cut_err, delimited, dispatch, empty, fail, opt, peek, preceded, separated, terminated,
};
use winnow::error::{ContextError, StrContext, StrContextValue};
use winnow::token::any;
use winnow::{ModalParser, ModalResult, Parser};

/// Parses a full expression, ternary conditionals included.
pub(super) fn expr(input: &mut Input) -> ModalResult<Node> {
    conditional.parse_next(input)
}

fn conditional(input: &mut Input) -> ModalResult<Node> {
    let cond = logical_or(input)?;

    let branches = opt((
        preceded((ws, '?', ws), cut_err(expr)),
        preceded((ws, cut_char(':'), ws), cut_err(expr)),
    ))
    .parse_next(input)?;

    match branches {
        Some((true_expr, false_expr)) => {
            let location = cond.location();
            Ok(Node::Conditional(Conditional {
                cond: Box::new(cond),
                true_expr: Box::new(true_expr),
                false_expr: Box::new(false_expr),
                location,
            }))
        }
        None => Ok(cond),
    }
}

/// Builds a left-associative binary level of the precedence chain.
fn binary<'a, P, O>(
    mut operand: P,
    mut operator: O,
) -> impl ModalParser<Input<'a>, Node, ContextError>
where
    P: ModalParser<Input<'a>, Node, ContextError>,
    O: ModalParser<Input<'a>, ArithmeticOp, ContextError>,
{
    move |input: &mut Input<'a>| {
        let mut node = operand.parse_next(input)?;

        while let Some((op, rhs)) = opt((
            preceded(ws, operator.by_ref()),
            preceded(ws, cut_err(operand.by_ref())),
        ))
        .parse_next(input)?
        {
            let location = node.location();
            node = Node::Arithmetic(Arithmetic {
                op,
                exprs: vec![node, rhs],
                location,
            });
        }

        Ok(node)
    }
}

fn logical_or(input: &mut Input) -> ModalResult<Node> {
    binary(logical_and, "||".value(ArithmeticOp::LogicalOr)).parse_next(input)
}

fn logical_and(input: &mut Input) -> ModalResult<Node> {
    binary(equality, "&&".value(ArithmeticOp::LogicalAnd)).parse_next(input)
}

fn equality(input: &mut Input) -> ModalResult<Node> {
    binary(relational, equality_op).parse_next(input)
}

fn relational(input: &mut Input) -> ModalResult<Node> {
    binary(additive, relational_op).parse_next(input)
}

fn additive(input: &mut Input) -> ModalResult<Node> {
    binary(multiplicative, additive_op).parse_next(input)
}

fn multiplicative(input: &mut Input) -> ModalResult<Node> {
    binary(unary, multiplicative_op).parse_next(input)
}

fn equality_op(input: &mut Input) -> ModalResult<ArithmeticOp> {
    dispatch! {any;
        '=' => '='.value(ArithmeticOp::Equal),
        '!' => '='.value(ArithmeticOp::NotEqual),
        _ => fail,
    }
    .parse_next(input)
}

fn relational_op(input: &mut Input) -> ModalResult<ArithmeticOp> {
    dispatch! {any;
        '<' => alt((
            '='.value(ArithmeticOp::LessThanOrEqual),
            empty.value(ArithmeticOp::LessThan),
        )),
        '>' => alt((
            '='.value(ArithmeticOp::GreaterThanOrEqual),
            empty.value(ArithmeticOp::GreaterThan),
        )),
        _ => fail,
    }
    .parse_next(input)
}

fn additive_op(input: &mut Input) -> ModalResult<ArithmeticOp> {
    dispatch! {any;
        '+' => empty.value(ArithmeticOp::Add),
        '-' => empty.value(ArithmeticOp::Sub),
        _ => fail,
    }
    .parse_next(input)
}

fn multiplicative_op(input: &mut Input) -> ModalResult<ArithmeticOp> {
    dispatch! {any;
        '*' => empty.value(ArithmeticOp::Mul),
        '/' => empty.value(ArithmeticOp::Div),
        '%' => empty.value(ArithmeticOp::Mod),
        _ => fail,
    }
    .parse_next(input)
}

fn unary(input: &mut Input) -> ModalResult<Node> {
    dispatch! {peek(any);
        '-' => negation,
        '!' => logical_not,
        _ => postfix,
    }
    .parse_next(input)
}

/// `-x` desugars to `0 - x`.
fn negation(input: &mut Input) -> ModalResult<Node> {
    let (_, location) = located('-').parse_next(input)?;
    let operand = preceded(ws, cut_err(unary)).parse_next(input)?;

    let zero = Node::Literal(Literal {
        value: Value::Int(0),
        location,
    });

    Ok(Node::Arithmetic(Arithmetic {
        op: ArithmeticOp::Sub,
        exprs: vec![zero, operand],
        location,
    }))
}

/// `!x` desugars to `x == false`.
fn logical_not(input: &mut Input) -> ModalResult<Node> {
    let (_, location) = located('!').parse_next(input)?;
    let operand = preceded(ws, cut_err(unary)).parse_next(input)?;

    let comparand = Node::Literal(Literal {
        value: Value::Bool(false),
        location,
    });

    Ok(Node::Arithmetic(Arithmetic {
        op: ArithmeticOp::Equal,
        exprs: vec![operand, comparand],
        location,
    }))
}

fn postfix(input: &mut Input) -> ModalResult<Node> {
    let mut node = primary.parse_next(input)?;

    while opt(preceded(ws, '[')).parse_next(input)?.is_some() {
        let key = delimited(ws, cut_err(expr), (ws, cut_char(']'))).parse_next(input)?;
        let location = node.location();
        node = Node::Index(Index {
            target: Box::new(node),
            key: Box::new(key),
            location,
        });
    }

    Ok(node)
}

fn primary(input: &mut Input) -> ModalResult<Node> {
    dispatch! {peek(any);
        '"' => quoted,
        '(' => parenthesis,
        '0'..='9' => number_literal,
        _ => alt((
            identlike,
            cut_err(fail)
                .context(StrContext::Label("expression"))
                .context(StrContext::Expected(StrContextValue::CharLiteral('"')))
                .context(StrContext::Expected(StrContextValue::CharLiteral('(')))
                .context(StrContext::Expected(StrContextValue::Description("number")))
                .context(StrContext::Expected(StrContextValue::Description("identifier"))),
        )),
    }
    .parse_next(input)
}

fn number_literal(input: &mut Input) -> ModalResult<Node> {
    located(number)
        .map(|(value, location)| Node::Literal(Literal { value, location }))
        .parse_next(input)
}

fn parenthesis(input: &mut Input) -> ModalResult<Node> {
    preceded(('(', ws), cut_err(terminated(expr, (ws, cut_char(')'))))).parse_next(input)
}

fn identlike(input: &mut Input) -> ModalResult<Node> {
    let (name, location) = located(ident).parse_next(input)?;

    let args = opt(preceded(
        (ws, '('),
        cut_err(terminated(call_args, (ws, cut_char(')')))),
    ))
    .parse_next(input)?;

    let node = match args {
        Some(args) => Node::Call(FuncCall {
            name: name.to_owned(),
            args,
            location,
        }),
        None => match name {
            "true" => Node::Literal(Literal {
                value: Value::Bool(true),
                location,
            }),
            "false" => Node::Literal(Literal {
                value: Value::Bool(false),
                location,
            }),
            _ => Node::Variable(VariableExpr {
                name: name.to_owned(),
                location,
            }),
        },
    };

    Ok(node)
}

fn call_args(input: &mut Input) -> ModalResult<Vec<Node>> {
    // An empty argument list must be detected up front: probing `expr`
    // against the closing `)` would cut instead of backtracking.
    if opt(peek(preceded(ws, ')'))).parse_next(input)?.is_some() {
        return Ok(Vec::new());
    }

    separated(1.., preceded(ws, expr), (ws, ',')).parse_next(input)
}
