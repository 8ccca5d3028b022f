//! Entity Invariant Tests
//!
//! - Construction is all-or-nothing: one failing field rejects the whole input
//! - Instances never change; copies with updates are re-validated
//! - Embedded entities are resolved through the registry by name
//! - Error paths name the offending field

use std::sync::Arc;

use nonobvious::entity::{EntityDef, EntityError, EntityRegistry, Field, FieldKind};
use nonobvious::frozen::FrozenMap;
use nonobvious::validator::ValidationErrorCode;
use nonobvious::Value;

// =============================================================================
// Helper Functions
// =============================================================================

fn data(pairs: &[(&str, Value)]) -> FrozenMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn setup_registry() -> EntityRegistry {
    let registry = EntityRegistry::new();

    registry
        .define("Address")
        .field(Field::string("city").required())
        .field(Field::string("zip").pattern(r"\d{5}").unwrap())
        .build()
        .unwrap();

    registry
        .define("User")
        .field(Field::string("email").required())
        .field(Field::string("role").choices(["admin", "guest"]).default("guest"))
        .field(Field::integer("age").nullable())
        .field(Field::embedded("address", "Address"))
        .field(Field::list("tags", FieldKind::String))
        .build()
        .unwrap();

    registry
}

fn validation_code(err: &EntityError) -> ValidationErrorCode {
    err.as_validation().expect("validation error").code()
}

// =============================================================================
// Construction
// =============================================================================

/// Defaults fill in missing optional fields.
#[test]
fn test_defaults_applied() {
    let registry = setup_registry();
    let user = registry
        .create("User", data(&[("email", Value::from("a@example.com"))]))
        .unwrap();

    assert_eq!(user.get_str("role"), Some("guest"));
    assert_eq!(user.get_str("email"), Some("a@example.com"));
}

/// A single bad field rejects the input; nothing is constructed.
#[test]
fn test_all_or_nothing() {
    let registry = setup_registry();
    let err = registry
        .create(
            "User",
            data(&[
                ("email", Value::from("a@example.com")),
                ("role", Value::from("root")),
            ]),
        )
        .unwrap_err();

    assert_eq!(validation_code(&err), ValidationErrorCode::InvalidChoice);
}

/// Missing required field is reported by name.
#[test]
fn test_missing_required_field() {
    let registry = setup_registry();
    let err = registry.create("User", FrozenMap::new()).unwrap_err();

    let validation = err.as_validation().unwrap();
    assert_eq!(validation.code(), ValidationErrorCode::MissingField);
    assert_eq!(validation.field_path(), Some("email"));
}

/// Undeclared keys are rejected.
#[test]
fn test_unknown_field_rejected() {
    let registry = setup_registry();
    let err = registry
        .create(
            "User",
            data(&[
                ("email", Value::from("a@example.com")),
                ("nickname", Value::from("al")),
            ]),
        )
        .unwrap_err();

    assert_eq!(validation_code(&err), ValidationErrorCode::UnknownField);
}

/// Null is only accepted by nullable fields.
#[test]
fn test_null_handling() {
    let registry = setup_registry();

    let ok = registry.create(
        "User",
        data(&[("email", Value::from("a@example.com")), ("age", Value::Null)]),
    );
    assert!(ok.is_ok());

    let err = registry
        .create("User", data(&[("email", Value::Null)]))
        .unwrap_err();
    assert_eq!(validation_code(&err), ValidationErrorCode::NullValue);
}

// =============================================================================
// Embedding
// =============================================================================

/// Nested maps become entities of the embedded type.
#[test]
fn test_embedded_map_becomes_entity() {
    let registry = setup_registry();
    let address = data(&[("city", Value::from("Oslo")), ("zip", Value::from("01234"))]);
    let user = registry
        .create(
            "User",
            data(&[
                ("email", Value::from("a@example.com")),
                ("address", Value::Map(address)),
            ]),
        )
        .unwrap();

    let embedded = user.get_entity("address").unwrap();
    assert_eq!(embedded.name(), "Address");
    assert_eq!(embedded.get_str("city"), Some("Oslo"));
}

/// Errors inside embedded entities carry the full path.
#[test]
fn test_embedded_error_path() {
    let registry = setup_registry();
    let address = data(&[("city", Value::from("Oslo")), ("zip", Value::from("12"))]);
    let err = registry
        .create(
            "User",
            data(&[
                ("email", Value::from("a@example.com")),
                ("address", Value::Map(address)),
            ]),
        )
        .unwrap_err();

    let validation = err.as_validation().unwrap();
    assert_eq!(validation.code(), ValidationErrorCode::PatternMismatch);
    assert_eq!(validation.field_path(), Some("address.zip"));
}

/// Entities of the wrong type are not accepted as embedded values.
#[test]
fn test_embedded_wrong_entity() {
    let registry = setup_registry();
    let other = registry
        .create("User", data(&[("email", Value::from("b@example.com"))]))
        .unwrap();

    let err = registry
        .create(
            "User",
            data(&[
                ("email", Value::from("a@example.com")),
                ("address", Value::Entity(other)),
            ]),
        )
        .unwrap_err();
    assert_eq!(validation_code(&err), ValidationErrorCode::TypeMismatch);
}

/// List items are validated with their index in the path.
#[test]
fn test_list_item_path() {
    let registry = setup_registry();
    let tags = Value::List(vec![Value::from("a"), Value::Int(2)].into());
    let err = registry
        .create(
            "User",
            data(&[("email", Value::from("a@example.com")), ("tags", tags)]),
        )
        .unwrap_err();

    assert_eq!(err.as_validation().unwrap().field_path(), Some("tags[1]"));
}

/// References to unregistered entities are found before use.
#[test]
fn test_dangling_reference_detected() {
    let registry = EntityRegistry::new();
    registry
        .define("Order")
        .field(Field::embedded("customer", "Customer"))
        .build()
        .unwrap();

    assert!(registry.check_references().is_err());
}

// =============================================================================
// Immutability
// =============================================================================

/// Updates produce a new instance and leave the original untouched.
#[test]
fn test_copy_with_leaves_original() {
    let registry = setup_registry();
    let user = registry
        .create("User", data(&[("email", Value::from("a@example.com"))]))
        .unwrap();

    let admin = user.copy_with([("role", "admin")]).unwrap();
    assert_eq!(admin.get_str("role"), Some("admin"));
    assert_eq!(user.get_str("role"), Some("guest"));
    assert_ne!(user, admin);
}

/// Updates are validated like construction.
#[test]
fn test_copy_with_validates() {
    let registry = setup_registry();
    let user = registry
        .create("User", data(&[("email", Value::from("a@example.com"))]))
        .unwrap();

    assert!(user.copy_with([("role", "root")]).is_err());
}

/// Equal data means equal entities.
#[test]
fn test_equality_by_value() {
    let registry = setup_registry();
    let input = data(&[("email", Value::from("a@example.com"))]);
    let a = registry.create("User", input.clone()).unwrap();
    let b = registry.create("User", input).unwrap();

    assert_eq!(a, b);
    assert_eq!(a, a.copy());
}

/// Definitions built outside a registry work once registered.
#[test]
fn test_standalone_definition() {
    let def: Arc<EntityDef> = EntityDef::builder("Point")
        .field(Field::integer("x").required())
        .field(Field::integer("y").required())
        .build()
        .unwrap();

    let point = def
        .create(data(&[("x", Value::Int(1)), ("y", Value::Int(2))]))
        .unwrap();
    assert_eq!(point.get_i64("y"), Some(2));

    let registry = EntityRegistry::new();
    registry.register(def.clone()).unwrap();
    assert!(matches!(
        registry.register(def),
        Err(EntityError::DuplicateEntity(_))
    ));
}
