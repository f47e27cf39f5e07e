//! The typed value model shared by the parser, the checks and the evaluator.

use std::fmt;

/// The map type used for map values.
///
/// Iteration order matches insertion order so that evaluation results are
/// deterministic across runs.
pub type Map<K = String, V = Value> = indexmap::IndexMap<K, V>;

/// The closed set of types a value or expression can have.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// The type of nothing; never produced by a successful check.
    Invalid,
    /// A string.
    String,
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit float.
    Float,
    /// A boolean.
    Bool,
    /// A list of values with a common element type.
    List,
    /// A map from string keys to values with a common value type.
    Map,
    /// The sentinel for values that cannot be computed yet. Propagates
    /// through every operation without raising an error.
    Unknown,
    /// Matches any type. Only meaningful in function signatures; a checked
    /// expression never has this type.
    Any,
}

impl Type {
    /// Returns the type of a value.
    pub fn of(value: &Value) -> Type {
        match value {
            Value::String(_) => Type::String,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Bool(_) => Type::Bool,
            Value::List(_) => Type::List,
            Value::Map(_) => Type::Map,
            Value::Unknown => Type::Unknown,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Type::Invalid => "invalid",
            Type::String => "string",
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::List => "list",
            Type::Map => "map",
            Type::Unknown => "unknown",
            Type::Any => "any",
        })
    }
}

/// Represents any value an expression can evaluate to.
///
/// Scope variables are `Value`s as well; binding [`Value::Unknown`] marks a
/// variable as a placeholder whose value is not computable yet.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A float value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A list of values. Elements are expected to share one type; this is
    /// verified lazily when the list is indexed, not at construction.
    List(Vec<Value>),
    /// A map of values. The same lazy homogeneity rule as for lists applies
    /// to the map values.
    Map(Map),
    /// The "not computable yet" placeholder.
    Unknown,
}

impl Value {
    /// Returns the type of this value.
    pub fn ty(&self) -> Type {
        Type::of(self)
    }

    /// If the value is a string, returns it as a `&str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an int, returns it.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a float, returns it.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a bool, returns it.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a list, returns a reference to its elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to it.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` if the value is the unknown placeholder.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(n) => f.write_str(itoa::Buffer::new().format(*n)),
            Value::Float(n) => f.write_str(ryu::Buffer::new().format(*n)),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::List(list) => {
                f.write_str("[")?;
                for (i, value) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(value, f)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                f.write_str("}")
            }
            Value::Unknown => f.write_str("unknown"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(list: Vec<T>) -> Value {
        Value::List(list.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Value {
        Value::Map(map)
    }
}

impl<T> FromIterator<T> for Value
where
    T: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Value {
        Value::List(iter.into_iter().map(Into::into).collect())
    }
}

