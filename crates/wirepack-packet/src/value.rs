use bytes::Bytes;

use crate::tags::ViewKind;

/// The closed set of values the packet format can carry.
///
/// Kind decisions happen once, at this boundary; the encoder matches
/// exhaustively and never inspects anything at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    /// Encoded under the integer tags while the magnitude fits a `u32`;
    /// larger magnitudes fall back to the `Double` framing.
    Int(i64),
    Double(f64),
    /// Epoch milliseconds.
    Date(f64),
    String(String),
    /// Raw bytes, framed as an opaque buffer.
    Bytes(Bytes),
    /// Each element is its own complete frame inside the array payload.
    Array(Vec<Value>),
    /// A (possibly typed) view over raw bytes.
    TypedArray { kind: ViewKind, bytes: Bytes },
    /// Anything else, delegated to the pluggable object format.
    Object(serde_json::Value),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Object(v)
    }
}
