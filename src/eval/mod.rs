//! Evaluate parsed templates against a set of variables and functions.
//!
//! Evaluation runs three passes over the tree produced by
//! [`parse`][crate::parse]: an identifier check (every variable and
//! function resolves, call arities match), a type check (operators are
//! lowered into internal function calls and implicit conversions are
//! inserted), and a walk of the rewritten tree that computes the result
//! value. The input tree is never modified.
//!
//! Variables bound to [`Value::Unknown`] mark input that is not computable
//! yet: instead of failing, every expression touching such a value
//! evaluates to `Value::Unknown` as well.
//!
//! # Example
//!
//! ```
//! use interp::eval::{Context, FuncArgs, FuncDef};
//! use interp::{Type, Value};
//!
//! fn upper(args: FuncArgs) -> Result<Value, String> {
//!     match args.first() {
//!         Some(Value::String(s)) => Ok(Value::from(s.to_uppercase())),
//!         _ => Err(String::from("expected a string argument")),
//!     }
//! }
//!
//! let mut ctx = Context::new();
//! ctx.define_var("name", "world");
//! ctx.define_func(
//!     "upper",
//!     FuncDef::builder()
//!         .param(Type::String)
//!         .returns(Type::String)
//!         .build(upper),
//! );
//!
//! let node = interp::parse("Hello, ${upper(name)}!")?;
//! let result = interp::evaluate(&node, &ctx)?;
//!
//! assert_eq!(result.value(), &Value::from("Hello, WORLD!"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builtin;
mod check;
mod error;
mod expr;
mod func;

pub use self::error::{Error, ErrorKind, EvalResult};
pub use self::func::{Func, FuncArgs, FuncDef, FuncDefBuilder};

use crate::ast::Node;
use crate::value::{Map, Type, Value};

/// A caller-supplied semantic check, run for every node of the tree before
/// evaluation. Returning an error message aborts the evaluation.
pub type SemanticCheck = fn(&Node) -> Result<(), String>;

/// Resolves the variables and functions expressions refer to.
pub trait Scope {
    /// Looks up the value bound to a variable name.
    fn lookup_var(&self, name: &str) -> Option<&Value>;

    /// Looks up the definition bound to a function name.
    fn lookup_func(&self, name: &str) -> Option<&FuncDef>;
}

/// A map-backed [`Scope`] holding variable bindings and function
/// definitions.
///
/// Function names starting with `__builtin_` are reserved for the internal
/// operator functions; a definition under such a name is shadowed by the
/// internal one.
#[derive(Clone, Debug, Default)]
pub struct Context {
    vars: Map<String, Value>,
    funcs: Map<String, FuncDef>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Context {
        Context::default()
    }

    /// Binds a variable to a value.
    ///
    /// Binding [`Value::Unknown`] marks the variable as not computable yet.
    pub fn define_var(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Makes a function available under the given name.
    pub fn define_func(&mut self, name: impl Into<String>, def: FuncDef) {
        self.funcs.insert(name.into(), def);
    }
}

impl Scope for Context {
    fn lookup_var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    fn lookup_func(&self, name: &str) -> Option<&FuncDef> {
        self.funcs.get(name)
    }
}

/// The outcome of evaluating a tree.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
    ty: Type,
    value: Value,
}

impl EvaluationResult {
    fn new(value: Value) -> EvaluationResult {
        EvaluationResult {
            ty: Type::of(&value),
            value,
        }
    }

    /// Returns the type of the result.
    ///
    /// Template roots produce `Type::String`, except when the template is a
    /// single interpolation of a list or map value, or when some input was
    /// unknown.
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Returns the result value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the result, returning the value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Node {
    /// Checks and evaluates the tree against a scope.
    ///
    /// Convenience for [`evaluate`].
    pub fn evaluate<S>(&self, scope: &S) -> EvalResult<EvaluationResult>
    where
        S: Scope + ?Sized,
    {
        evaluate(self, scope)
    }
}

/// Checks and evaluates a tree against a scope.
///
/// # Errors
///
/// Fails if an identifier does not resolve, a type rule is violated, or a
/// runtime operation (function call, index access) fails. Unknown input is
/// not an error; see the [module docs][self].
pub fn evaluate<S>(node: &Node, scope: &S) -> EvalResult<EvaluationResult>
where
    S: Scope + ?Sized,
{
    evaluate_with_checks(node, scope, &[])
}

/// Like [`evaluate`], with additional caller-supplied semantic checks run
/// for every node before evaluation.
///
/// This is the hook for embedding applications that restrict what templates
/// may do, e.g. forbid certain function calls.
pub fn evaluate_with_checks<S>(
    node: &Node,
    scope: &S,
    checks: &[SemanticCheck],
) -> EvalResult<EvaluationResult>
where
    S: Scope + ?Sized,
{
    check::check_identifiers(node, scope, checks)?;
    let (node, _) = check::check_types(node, scope)?;
    let value = expr::eval(&node, scope)?;
    Ok(EvaluationResult::new(value))
}
