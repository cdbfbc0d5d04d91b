//! Contract tests for catalog persistence and binder configuration.

use filterbind::catalog::{Catalog, ConversionTable, SchemaCatalog};
use filterbind::{BindError, BinderConfig};

use crate::fixtures::{bind_filter, employee_catalog, lit, matching_ids, op, prop};

#[test]
fn test_persisted_catalog_binds_identically() {
    let catalog = employee_catalog();
    let bytes = catalog.serialize().expect("serialize catalog");
    let restored = Catalog::deserialize(&bytes).expect("deserialize catalog");

    let filter = || op("has", prop("AccessLevel"), lit("Read, Write"));
    let original = bind_filter(&catalog, filter()).unwrap();
    let reloaded = bind_filter(&restored, filter()).unwrap();
    assert_eq!(original, reloaded);
    assert_eq!(matching_ids(&reloaded), vec![3]);
    assert_eq!(restored.key_members("Employee"), vec!["ID".to_string()]);
}

#[test]
fn test_corrupt_catalog_bytes() {
    let err = Catalog::deserialize(&[0xff, 0x01]).unwrap_err();
    assert!(matches!(err, BindError::CatalogError(_)));
}

#[test]
fn test_conversion_table_drives_promotion() {
    let strict = employee_catalog().with_conversions(ConversionTable::empty());
    let err = bind_filter(&strict, op("gt", prop("Salary"), lit(5000))).unwrap_err();
    assert_eq!(
        err,
        BindError::TypeMismatch {
            operation: "gt".into(),
            operands: vec!["Float64?".into(), "Int32".into()],
        }
    );

    let lenient = employee_catalog();
    assert!(bind_filter(&lenient, op("gt", prop("Salary"), lit(5000))).is_ok());
}

#[test]
fn test_conversion_table_from_json() {
    let table: ConversionTable = serde_json::from_str(
        r#"{
            "implicit": [{"from": "Int32", "to": "Float64"}],
            "explicit": []
        }"#,
    )
    .expect("parse conversion table");
    let catalog = employee_catalog().with_conversions(table);
    assert!(bind_filter(&catalog, op("gt", prop("Salary"), lit(5000))).is_ok());
    assert!(bind_filter(&catalog, op("gt", prop("ID"), lit(5_000_000_000_i64))).is_err());
}

#[test]
fn test_binder_config_from_json() {
    let config = BinderConfig::from_json(r#"{"max_depth": 12}"#).unwrap();
    assert_eq!(config.max_depth, 12);
    assert!(!config.ensure_stable_ordering);

    let err = BinderConfig::from_json(r#"{"max_depth": "deep"}"#).unwrap_err();
    assert!(matches!(err, BindError::ConfigError(_)));
}
