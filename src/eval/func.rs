use crate::value::{Type, Value};
use std::ops;

/// The signature of function callbacks.
///
/// Callbacks receive already-evaluated, type-validated argument values and
/// either produce a value or fail with a message. The message is wrapped
/// into [`ErrorKind::FuncCall`][super::ErrorKind::FuncCall] together with
/// the function name.
pub type Func = fn(FuncArgs) -> Result<Value, String>;

/// The definition of a function that expressions can call.
///
/// A definition declares positional parameter types, an optional variadic
/// tail and the return type. The return type is what the type check assigns
/// to call expressions; the arguments are implicitly converted towards the
/// declared parameter types where possible.
#[derive(Clone, Debug)]
pub struct FuncDef {
    params: Vec<Type>,
    variadic: Option<Type>,
    ret: Type,
    func: Func,
}

impl FuncDef {
    /// Creates a builder for a function definition.
    pub fn builder() -> FuncDefBuilder {
        FuncDefBuilder {
            params: Vec::new(),
            variadic: None,
            ret: Type::String,
        }
    }

    /// Returns the declared positional parameter types.
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    /// Returns the declared variadic parameter type, if any.
    pub fn variadic(&self) -> Option<Type> {
        self.variadic
    }

    /// Returns the declared return type.
    pub fn return_type(&self) -> Type {
        self.ret
    }

    /// Calls the function with already-evaluated argument values.
    ///
    /// Arity and argument types are validated against the definition before
    /// the callback runs. `Type::Any` parameters accept every value.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, String> {
        let expected = self.params.len();
        let given = args.len();

        if given < expected || (self.variadic.is_none() && given > expected) {
            let suffix = if self.variadic.is_some() { " or more" } else { "" };
            return Err(format!(
                "expected {expected}{suffix} arguments, got {given}"
            ));
        }

        for (pos, value) in args.iter().enumerate() {
            let want = self
                .params
                .get(pos)
                .copied()
                .or(self.variadic)
                .unwrap_or(Type::Any);
            let actual = Type::of(value);

            if want != Type::Any && actual != want {
                return Err(format!(
                    "expected argument at position {pos} to be of type {want}, got {actual}"
                ));
            }
        }

        (self.func)(FuncArgs::new(args, expected))
    }
}

/// A builder for [`FuncDef`] values.
///
/// The return type defaults to `Type::String` when not declared.
#[derive(Debug)]
pub struct FuncDefBuilder {
    params: Vec<Type>,
    variadic: Option<Type>,
    ret: Type,
}

impl FuncDefBuilder {
    /// Adds a positional parameter.
    pub fn param(mut self, ty: Type) -> FuncDefBuilder {
        self.params.push(ty);
        self
    }

    /// Adds multiple positional parameters.
    pub fn params(mut self, types: impl IntoIterator<Item = Type>) -> FuncDefBuilder {
        self.params.extend(types);
        self
    }

    /// Declares a variadic tail accepting any number of trailing arguments
    /// of the given type.
    pub fn variadic(mut self, ty: Type) -> FuncDefBuilder {
        self.variadic = Some(ty);
        self
    }

    /// Declares the return type.
    pub fn returns(mut self, ty: Type) -> FuncDefBuilder {
        self.ret = ty;
        self
    }

    /// Finishes the definition with the callback to invoke.
    pub fn build(self, func: Func) -> FuncDef {
        FuncDef {
            params: self.params,
            variadic: self.variadic,
            ret: self.ret,
            func,
        }
    }
}

/// Wrapper around the argument values passed to a function callback.
///
/// Dereferences to a slice of all values; [`positional`][FuncArgs::positional]
/// and [`variadic`][FuncArgs::variadic] split them according to the
/// definition the call was validated against.
#[derive(Clone, Debug)]
pub struct FuncArgs {
    values: Vec<Value>,
    positional: usize,
}

impl FuncArgs {
    fn new(values: Vec<Value>, positional: usize) -> FuncArgs {
        let positional = positional.min(values.len());
        FuncArgs { values, positional }
    }

    /// Returns the arguments bound to positional parameters.
    pub fn positional(&self) -> &[Value] {
        &self.values[..self.positional]
    }

    /// Returns the arguments bound to the variadic parameter.
    pub fn variadic(&self) -> &[Value] {
        &self.values[self.positional..]
    }

    /// Consumes the wrapper, returning all argument values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl ops::Deref for FuncArgs {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.values
    }
}
