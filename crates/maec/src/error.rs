//! Error types for entity conversion.

use thiserror::Error;

use maec_binding::BindingError;

/// The error type for all conversion operations.
#[derive(Error, Debug)]
pub enum EntityError {
    /// A value could not be placed into a typed list.
    #[error("can't put '{value}' ({actual_type}) into a {target}")]
    Coercion {
        value: String,
        actual_type: String,
        target: &'static str,
    },

    /// A non-mapping value could not be turned into the target type.
    #[error("could not instantiate a {target} from a {source_type}: {value}")]
    Construct {
        target: &'static str,
        source_type: &'static str,
        value: String,
    },

    /// A field value had the wrong shape for its declared kind.
    #[error("invalid value for field `{field}` of {entity}: expected {expected}, found {value}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    /// The parsed document declares a schema version this type does not read.
    #[error("unsupported schema version {found:?} for {entity}; expected {expected}")]
    UnsupportedVersion {
        entity: &'static str,
        expected: &'static str,
        found: Option<String>,
    },

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Name of the JSON kind of `value`, used in error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "dict",
    }
}

/// Result type alias for entity conversion
pub type Result<T> = std::result::Result<T, EntityError>;
