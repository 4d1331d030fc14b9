//! The host-side value model.
//!
//! Mirrors the value universe a dynamic host runtime exposes across its
//! boundary: enough structure for results, rejection reasons, combinator
//! aggregates and error objects. Handles are cheap to clone; compound
//! variants share their payload.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Error name carried by aggregate-shaped error values.
pub const AGGREGATE_ERROR_NAME: &str = "AggregateError";

/// Identifier of a promise slot inside the engine registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromiseId(pub(crate) u64);

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Promise({})", self.0)
    }
}

/// A host-side value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent/unit value.
    Undefined,
    /// Boolean.
    Bool(bool),
    /// Double-precision number.
    Number(f64),
    /// Immutable string.
    Text(Arc<str>),
    /// Ordered list.
    Array(Arc<[Value]>),
    /// String-keyed record.
    Object(Arc<BTreeMap<String, Value>>),
    /// Structured error object.
    Error(Arc<ErrorValue>),
    /// Handle to a promise slot owned by the engine.
    Promise(PromiseId),
}

/// Payload of an error-shaped value.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    /// Error class name, e.g. `Error` or `AggregateError`.
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Nested reasons; only aggregate errors populate this.
    pub errors: Vec<Value>,
}

impl Value {
    /// A string value.
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Self::Text(text.into())
    }

    /// An array value.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    /// An object value.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(Arc::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        ))
    }

    /// A plain error object named `Error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::error_named("Error", message)
    }

    /// An error object with an explicit class name.
    pub fn error_named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(Arc::new(ErrorValue {
            name: name.into(),
            message: message.into(),
            errors: Vec::new(),
        }))
    }

    /// An aggregate error wrapping `errors` in order.
    pub fn aggregate(message: impl Into<String>, errors: Vec<Value>) -> Self {
        Self::Error(Arc::new(ErrorValue {
            name: AGGREGATE_ERROR_NAME.into(),
            message: message.into(),
            errors,
        }))
    }

    /// Whether this value carries a settlement-registration surface.
    pub fn is_thenable(&self) -> bool {
        matches!(self, Self::Promise(_))
    }

    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Property `key` of an object- or error-shaped value.
    pub fn member(&self, key: &str) -> Option<Value> {
        match self {
            Self::Object(map) => map.get(key).cloned(),
            Self::Error(error) => match key {
                "name" => Some(Value::text(error.name.clone())),
                "message" => Some(Value::text(error.message.clone())),
                "errors" if error.name == AGGREGATE_ERROR_NAME => {
                    Some(Value::array(error.errors.iter().cloned()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Element `index` of an array-shaped value.
    pub fn element(&self, index: usize) -> Option<Value> {
        match self {
            Self::Array(items) => items.get(index).cloned(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Self::Number(number.into())
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Number(number as f64)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl fmt::Display for Value {
    /// The host's generic string coercion.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => f.write_str(&coerce_number(*number)),
            Self::Text(text) => f.write_str(text),
            Self::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    // Undefined elements coerce to the empty string inside
                    // an array.
                    if !matches!(item, Self::Undefined) {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object Object]"),
            Self::Error(error) => {
                if error.message.is_empty() {
                    f.write_str(&error.name)
                } else {
                    write!(f, "{}: {}", error.name, error.message)
                }
            }
            Self::Promise(_) => f.write_str("[object Promise]"),
        }
    }
}

fn coerce_number(number: f64) -> String {
    if number.is_nan() {
        return "NaN".into();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if number.fract() == 0.0 && number.abs() < 1e15 {
        return format!("{}", number as i64);
    }
    format!("{number}")
}
