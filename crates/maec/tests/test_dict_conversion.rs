mod common;

use common::*;
use maec::{Convert, EntityError, Result};
use serde_json::{Value, json};

#[test]
fn test_action_dict_form() -> Result<()> {
    let action = sample_action("act-1", "create file");
    assert_eq!(
        action.to_dict(),
        json!({
            "id": "act-1",
            "ordinal_position": 1,
            "timestamp": "2014-02-11T10:00:00",
            "name": "create file",
            "tools": ["strace"],
            "hashes": [{"type": "MD5", "simple_hash_value": "0a1b2c"}],
        })
    );
    Ok(())
}

#[test]
fn test_dict_round_trip() -> Result<()> {
    let package = sample_package()?;
    let dict = package.to_dict();

    let back = Package::from_dict(Some(&dict))?.unwrap();
    assert_eq!(back, package);
    assert_eq!(back.to_dict(), dict);
    Ok(())
}

#[test]
fn test_to_dict_omits_unset_and_empty_fields() {
    let action = Action {
        name: Some("sleep".to_string()),
        ..Default::default()
    };
    assert_eq!(action.to_dict(), json!({"name": "sleep"}));

    let bundle = Bundle {
        actions: Some(maec::EntityList::new()),
        ..Default::default()
    };
    assert_eq!(bundle.to_dict(), json!({}));
}

#[test]
fn test_from_dict_back_fills_missing_fields() -> Result<()> {
    let action = Action::from_dict(Some(&json!({"name": "sleep"})))?.unwrap();
    assert_eq!(action.name.as_deref(), Some("sleep"));
    assert!(action.id.is_none());
    assert!(action.tools.is_empty());
    assert!(action.hashes.is_empty());

    let bundle = Bundle::from_dict(Some(&json!({"id": "bundle-9"})))?.unwrap();
    assert!(bundle.actions.is_none());
    assert!(bundle.senders.is_none());
    Ok(())
}

#[test]
fn test_from_dict_missing_input() -> Result<()> {
    assert!(Bundle::from_dict(None)?.is_none());
    assert!(Bundle::from_dict(Some(&Value::Null))?.is_none());
    Ok(())
}

#[test]
fn test_from_dict_scalar_uses_constructor() -> Result<()> {
    let action = Action::from_dict(Some(&json!("open socket")))?.unwrap();
    assert_eq!(action.name.as_deref(), Some("open socket"));
    Ok(())
}

#[test]
fn test_from_dict_scalar_without_constructor() {
    let err = Bundle::from_dict(Some(&json!(5))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not instantiate a Bundle from a number: 5"
    );
}

#[test]
fn test_nested_failure_propagates() {
    let dict = json!({"actions": [{"name": "ok"}, 7]});
    let err = Bundle::from_dict(Some(&dict)).unwrap_err();
    assert!(matches!(
        err,
        EntityError::Construct { target: "Action", source_type: "number", .. }
    ));
}

#[test]
fn test_list_field_requires_sequence() -> Result<()> {
    let dict = json!({"actions": {"name": "not a list"}});
    let bundle = Bundle::from_dict(Some(&dict))?.unwrap();
    assert!(bundle.actions.is_none());
    Ok(())
}

#[test]
fn test_scalar_for_multiple_field() -> Result<()> {
    let action = Action::from_dict(Some(&json!({"tools": "ltrace"})))?.unwrap();
    assert_eq!(action.tools, ["ltrace"]);
    Ok(())
}

#[test]
fn test_invalid_primitive_value() {
    let err = Action::from_dict(Some(&json!({"ordinal_position": "first"}))).unwrap_err();
    assert!(matches!(
        err,
        EntityError::InvalidField { field: "ordinal_position", .. }
    ));
}

#[test]
fn test_null_item_in_multiple_field_is_rejected() {
    let dict = json!({
        "hashes": [{"type": "MD5", "simple_hash_value": "0a1b2c"}, null],
    });
    let err = Action::from_dict(Some(&dict)).unwrap_err();
    assert!(matches!(err, EntityError::InvalidField { field: "hashes", .. }));
}

#[test]
fn test_nested_sequence_in_multiple_field_is_rejected() {
    let dict = json!({"hashes": [[{"type": "MD5"}]]});
    let err = Action::from_dict(Some(&dict)).unwrap_err();
    assert!(matches!(err, EntityError::InvalidField { field: "hashes", .. }));
}

#[test]
fn test_finalize_dict_adds_schema_version() -> Result<()> {
    let package = sample_package()?;
    let dict = package.to_dict();
    assert_eq!(dict["schema_version"], json!(PACKAGE_SCHEMA_VERSION));
    assert_eq!(dict["malware_subjects"][0]["findings_bundle"]["id"], json!("bundle-1"));
    Ok(())
}

#[test]
fn test_senders_round_trip_through_dict() -> Result<()> {
    let bundle = sample_bundle()?;
    let dict = bundle.to_dict();
    assert_eq!(
        dict["senders"],
        json!([{"category": "e-mail", "address_value": "a@example.com"}])
    );

    let back = Bundle::from_dict(Some(&dict))?.unwrap();
    assert_eq!(back.senders, bundle.senders);
    Ok(())
}

#[test]
fn test_to_json() -> Result<()> {
    let action = Action {
        name: Some("sleep".to_string()),
        tools: vec!["a".to_string(), "b".to_string()],
        ..Default::default()
    };
    assert_eq!(action.to_json()?, r#"{"name":"sleep","tools":["a","b"]}"#);

    let back: Option<Action> = maec::json::from_json_str(&action.to_json()?)?;
    assert_eq!(back, Some(action));
    Ok(())
}
