//! Primitive field values.
//!
//! Primitives pass through conversions unchanged apart from their lexical
//! form: binding objects hold text, the dictionary form holds JSON scalars.
//! Parsing is lenient in both directions so a value read from XML text can be
//! stored in a typed field.

use serde_json::Value;

/// A scalar that can live in a primitive field.
pub trait Primitive: Clone + PartialEq + Send + Sync + 'static {
    /// Name used in error messages.
    const KIND: &'static str;

    fn to_text(&self) -> String;

    fn from_text(text: &str) -> Option<Self>;

    fn to_json(&self) -> Value;

    fn from_json(value: &Value) -> Option<Self>;
}

impl Primitive for String {
    const KIND: &'static str = "string";

    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Primitive for bool {
    const KIND: &'static str = "bool";

    fn to_text(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        match text.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => Self::from_text(s),
            _ => None,
        }
    }
}

impl Primitive for f64 {
    const KIND: &'static str = "float";

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn to_json(&self) -> Value {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => Self::from_text(s),
            _ => None,
        }
    }
}

macro_rules! integer_primitive {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const KIND: &'static str = $kind;

                fn to_text(&self) -> String {
                    self.to_string()
                }

                fn from_text(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }

                fn to_json(&self) -> Value {
                    Value::from(*self)
                }

                fn from_json(value: &Value) -> Option<Self> {
                    match value {
                        Value::Number(n) => n
                            .as_i64()
                            .and_then(|v| <$ty>::try_from(v).ok())
                            .or_else(|| n.as_u64().and_then(|v| <$ty>::try_from(v).ok())),
                        Value::String(s) => Self::from_text(s),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_primitive! {
    i32 => "integer",
    i64 => "integer",
    u32 => "unsigned integer",
    u64 => "unsigned integer",
}
