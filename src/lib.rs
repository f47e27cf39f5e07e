//! A small expression language for string interpolation templates.
//!
//! Templates are plain text with embedded `${...}` expressions:
//!
//! ```text
//! Hello, ${name}! You have ${count + 1} messages.
//! ```
//!
//! [`parse`] turns a template into a syntax tree, and
//! [`evaluate`] renders the tree against a [`Scope`] of variables and
//! functions. Evaluation is preceded by an identifier check and a static
//! type check that inserts the implicit conversions between ints, floats,
//! strings and bools.
//!
//! Expressions support arithmetic (`+ - * / %`), comparisons
//! (`== != < > <= >=`), logical operators (`&& || !`), ternary
//! conditionals (`cond ? a : b`), function calls, list/map indexing
//! (`var[key]`) and nested interpolations inside quoted strings. `$${`
//! escapes a literal `${`.
//!
//! Variables bound to [`Value::Unknown`] represent input that cannot be
//! computed yet; expressions touching them successfully evaluate to
//! `Value::Unknown` instead of failing, which lets embedders run templates
//! in a "partial" mode.
//!
//! # Example
//!
//! ```
//! use interp::eval::Context;
//! use interp::{Type, Value};
//!
//! let mut ctx = Context::new();
//! ctx.define_var("name", "world");
//! ctx.define_var("count", 2);
//!
//! let node = interp::parse("Hello, ${name}! You have ${count + 1} messages.")?;
//! let result = interp::evaluate(&node, &ctx)?;
//!
//! assert_eq!(result.ty(), Type::String);
//! assert_eq!(
//!     result.value(),
//!     &Value::from("Hello, world! You have 3 messages.")
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod ast;
mod error;
pub mod eval;
pub mod parser;
pub mod value;

pub use self::error::{Error, Result};
pub use self::eval::{evaluate, evaluate_with_checks, Context, EvaluationResult, Scope};
pub use self::parser::parse;
pub use self::value::{Map, Type, Value};
