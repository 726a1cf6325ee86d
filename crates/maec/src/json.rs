//! JSON text for entity graphs.
//!
//! Entities encode their dictionary form with `serde_json`; decoding parses
//! the text and rebuilds the entity through `from_dict`.

use serde_json::Value;

use crate::convert::Convert;
use crate::error::Result;

/// Encodes the dictionary form of `value` as compact JSON.
///
/// # Examples
///
/// ```ignore
/// use maec::json::to_json_string;
///
/// let json = to_json_string(&bundle)?;
/// ```
pub fn to_json_string<T: Convert>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(&value.to_dict())?)
}

/// Encodes the dictionary form of `value` as indented JSON.
pub fn to_json_string_pretty<T: Convert>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&value.to_dict())?)
}

/// Encodes the dictionary form of `value` as JSON bytes.
pub fn to_json_vec<T: Convert>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&value.to_dict())?)
}

/// Parses JSON text and rebuilds a `T` from it.
///
/// Returns `Ok(None)` for the JSON literal `null`.
///
/// # Examples
///
/// ```ignore
/// use maec::json::from_json_str;
///
/// let bundle: Option<Bundle> = from_json_str(r#"{"id": "bundle-1"}"#)?;
/// ```
pub fn from_json_str<T: Convert>(s: &str) -> Result<Option<T>> {
    let value: Value = serde_json::from_str(s)?;
    T::from_dict(Some(&value))
}

/// Parses JSON bytes and rebuilds a `T` from them.
pub fn from_json_slice<T: Convert>(v: &[u8]) -> Result<Option<T>> {
    let value: Value = serde_json::from_slice(v)?;
    T::from_dict(Some(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::field::TypedField;
    use crate::typed_field;
    use maec_binding::BindingClass;
    use once_cell::sync::Lazy;

    #[derive(Debug, Default)]
    struct Label {
        value: Option<String>,
        weight: Option<u32>,
    }

    impl Entity for Label {
        const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "Label");

        fn fields() -> &'static [TypedField<Self>] {
            static FIELDS: Lazy<Vec<TypedField<Label>>> = Lazy::new(|| {
                vec![
                    typed_field!(primitive, Label, value, "Value").key_name("value"),
                    typed_field!(primitive, Label, weight, "Weight").key_name("weight"),
                ]
            });
            &FIELDS
        }
    }

    crate::impl_entity_eq!(Label);

    #[test]
    fn test_json_round_trip() -> Result<()> {
        let label = Label {
            value: Some("packed".to_string()),
            weight: Some(3),
        };
        let text = to_json_string(&label)?;
        assert_eq!(text, r#"{"value":"packed","weight":3}"#);

        let back: Option<Label> = from_json_str(&text)?;
        assert_eq!(back, Some(label));
        Ok(())
    }

    #[test]
    fn test_json_null_is_absent() -> Result<()> {
        let back: Option<Label> = from_json_slice(b"null")?;
        assert!(back.is_none());
        Ok(())
    }

    #[test]
    fn test_json_invalid_field_value() {
        let err = from_json_str::<Label>(r#"{"weight": "heavy"}"#).unwrap_err();
        assert!(err.to_string().contains("weight"));
    }
}
