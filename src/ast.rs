//! Types to represent the template syntax tree.
//!
//! Trees are produced by [`parse`][crate::parse] and consumed by the checks
//! and the evaluator in [`eval`][crate::eval]. Every node records the
//! 1-based source position it started at. Structural equality deliberately
//! ignores positions so that trees built by hand compare equal to parsed
//! ones.

use crate::value::Value;
use std::fmt;

/// A 1-based line/column position within the parsed input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// The line, starting at 1.
    pub line: usize,
    /// The column, starting at 1.
    pub col: usize,
}

impl Default for Location {
    fn default() -> Location {
        Location { line: 1, col: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}", self.line, self.col)
    }
}

/// The binary operators of the expression grammar.
///
/// The discriminant is stable: the type check lowers operator applications
/// into calls that receive the operator as an integer literal argument, and
/// the receiving function recovers it via [`ArithmeticOp::from_int`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// The `+` operator.
    Add = 1,
    /// The `-` operator.
    Sub = 2,
    /// The `*` operator.
    Mul = 3,
    /// The `/` operator.
    Div = 4,
    /// The `%` operator.
    Mod = 5,
    /// The `&&` operator.
    LogicalAnd = 6,
    /// The `||` operator.
    LogicalOr = 7,
    /// The `==` operator.
    Equal = 8,
    /// The `!=` operator.
    NotEqual = 9,
    /// The `<` operator.
    LessThan = 10,
    /// The `>` operator.
    GreaterThan = 11,
    /// The `<=` operator.
    LessThanOrEqual = 12,
    /// The `>=` operator.
    GreaterThanOrEqual = 13,
}

impl ArithmeticOp {
    /// Returns the operator's wire discriminant.
    pub fn as_int(self) -> i64 {
        self as i64
    }

    /// Recovers an operator from its wire discriminant.
    pub fn from_int(n: i64) -> Option<ArithmeticOp> {
        let op = match n {
            1 => ArithmeticOp::Add,
            2 => ArithmeticOp::Sub,
            3 => ArithmeticOp::Mul,
            4 => ArithmeticOp::Div,
            5 => ArithmeticOp::Mod,
            6 => ArithmeticOp::LogicalAnd,
            7 => ArithmeticOp::LogicalOr,
            8 => ArithmeticOp::Equal,
            9 => ArithmeticOp::NotEqual,
            10 => ArithmeticOp::LessThan,
            11 => ArithmeticOp::GreaterThan,
            12 => ArithmeticOp::LessThanOrEqual,
            13 => ArithmeticOp::GreaterThanOrEqual,
            _ => return None,
        };
        Some(op)
    }

    /// Returns the operator as it appears in the source.
    pub fn as_str(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
            ArithmeticOp::LogicalAnd => "&&",
            ArithmeticOp::LogicalOr => "||",
            ArithmeticOp::Equal => "==",
            ArithmeticOp::NotEqual => "!=",
            ArithmeticOp::LessThan => "<",
            ArithmeticOp::GreaterThan => ">",
            ArithmeticOp::LessThanOrEqual => "<=",
            ArithmeticOp::GreaterThanOrEqual => ">=",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the template syntax tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A literal value.
    Literal(Literal),
    /// A variable access.
    Variable(VariableExpr),
    /// An index operation on a list or map variable.
    Index(Index),
    /// A function call.
    Call(FuncCall),
    /// A binary operator application. Lowered into a `Call` by the type
    /// check; never reaches the evaluator.
    Arithmetic(Arithmetic),
    /// A ternary conditional.
    Conditional(Conditional),
    /// The template root: the sequence of literal text pieces and
    /// interpolated expressions making up the output.
    Output(Output),
}

impl Node {
    /// Returns the source position of the node.
    pub fn location(&self) -> Location {
        match self {
            Node::Literal(lit) => lit.location,
            Node::Variable(var) => var.location,
            Node::Index(index) => index.location,
            Node::Call(call) => call.location,
            Node::Arithmetic(arith) => arith.location,
            Node::Conditional(cond) => cond.location,
            Node::Output(output) => output.location,
        }
    }

    /// Visits the tree in post-order, children before their parent, invoking
    /// `f` for every node. Traversal stops at the first error.
    pub fn walk<E, F>(&self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&Node) -> Result<(), E>,
    {
        match self {
            Node::Literal(_) | Node::Variable(_) => {}
            Node::Index(index) => {
                index.target.walk(f)?;
                index.key.walk(f)?;
            }
            Node::Call(call) => {
                for arg in &call.args {
                    arg.walk(f)?;
                }
            }
            Node::Arithmetic(arith) => {
                for expr in &arith.exprs {
                    expr.walk(f)?;
                }
            }
            Node::Conditional(cond) => {
                cond.cond.walk(f)?;
                cond.true_expr.walk(f)?;
                cond.false_expr.walk(f)?;
            }
            Node::Output(output) => {
                for expr in &output.exprs {
                    expr.walk(f)?;
                }
            }
        }
        f(self)
    }
}

/// A literal value embedded in the tree.
#[derive(Clone, Debug)]
pub struct Literal {
    /// The value.
    pub value: Value,
    /// The source position.
    pub location: Location,
}

impl Literal {
    /// Creates a literal node from anything convertible to a value.
    pub fn new(value: impl Into<Value>) -> Literal {
        Literal {
            value: value.into(),
            location: Location::default(),
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Literal) -> bool {
        self.value == other.value
    }
}

/// A variable access by name.
///
/// Names may be dotted paths (`var.foo.*.id`); the scope resolves the whole
/// path as one opaque name.
#[derive(Clone, Debug)]
pub struct VariableExpr {
    /// The variable name.
    pub name: String,
    /// The source position.
    pub location: Location,
}

impl VariableExpr {
    /// Creates a variable access node.
    pub fn new(name: impl Into<String>) -> VariableExpr {
        VariableExpr {
            name: name.into(),
            location: Location::default(),
        }
    }
}

impl PartialEq for VariableExpr {
    fn eq(&self, other: &VariableExpr) -> bool {
        self.name == other.name
    }
}

/// An index operation, `target[key]`.
#[derive(Clone, Debug)]
pub struct Index {
    /// The collection being indexed. Must be a direct variable access.
    pub target: Box<Node>,
    /// The index key expression.
    pub key: Box<Node>,
    /// The source position.
    pub location: Location,
}

impl Index {
    /// Creates an index node.
    pub fn new(target: Node, key: Node) -> Index {
        Index {
            target: Box::new(target),
            key: Box::new(key),
            location: Location::default(),
        }
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Index) -> bool {
        self.target == other.target && self.key == other.key
    }
}

/// A function call.
#[derive(Clone, Debug)]
pub struct FuncCall {
    /// The function name.
    pub name: String,
    /// The argument expressions.
    pub args: Vec<Node>,
    /// The source position.
    pub location: Location,
}

impl FuncCall {
    /// Creates a call node.
    pub fn new(name: impl Into<String>, args: Vec<Node>) -> FuncCall {
        FuncCall {
            name: name.into(),
            args,
            location: Location::default(),
        }
    }
}

impl PartialEq for FuncCall {
    fn eq(&self, other: &FuncCall) -> bool {
        self.name == other.name && self.args == other.args
    }
}

/// A binary operator application.
///
/// Unary `-x` and `!x` are desugared by the parser into `0 - x` and
/// `x == false`, so this node covers the whole operator surface.
#[derive(Clone, Debug)]
pub struct Arithmetic {
    /// The operator.
    pub op: ArithmeticOp,
    /// The operand expressions, in source order.
    pub exprs: Vec<Node>,
    /// The source position.
    pub location: Location,
}

impl Arithmetic {
    /// Creates an operator node.
    pub fn new(op: ArithmeticOp, exprs: Vec<Node>) -> Arithmetic {
        Arithmetic {
            op,
            exprs,
            location: Location::default(),
        }
    }
}

impl PartialEq for Arithmetic {
    fn eq(&self, other: &Arithmetic) -> bool {
        self.op == other.op && self.exprs == other.exprs
    }
}

/// A ternary conditional, `cond ? true_expr : false_expr`.
#[derive(Clone, Debug)]
pub struct Conditional {
    /// The condition.
    pub cond: Box<Node>,
    /// The expression selected when the condition is true.
    pub true_expr: Box<Node>,
    /// The expression selected when the condition is false.
    pub false_expr: Box<Node>,
    /// The source position.
    pub location: Location,
}

impl Conditional {
    /// Creates a conditional node.
    pub fn new(cond: Node, true_expr: Node, false_expr: Node) -> Conditional {
        Conditional {
            cond: Box::new(cond),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
            location: Location::default(),
        }
    }
}

impl PartialEq for Conditional {
    fn eq(&self, other: &Conditional) -> bool {
        self.cond == other.cond
            && self.true_expr == other.true_expr
            && self.false_expr == other.false_expr
    }
}

/// The template root node.
#[derive(Clone, Debug, Default)]
pub struct Output {
    /// The template fragments, in source order.
    pub exprs: Vec<Node>,
    /// The source position.
    pub location: Location,
}

impl Output {
    /// Creates an output node.
    pub fn new(exprs: Vec<Node>) -> Output {
        Output {
            exprs,
            location: Location::default(),
        }
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Output) -> bool {
        self.exprs == other.exprs
    }
}
