use std::sync::Arc;

use jsonmodel::catalog::{CatalogOptions, list_fields};
use jsonmodel::prelude::*;
use jsonmodel::{EnumValue, RelatedRecord};
use serde_json::{Map, Value as JsonValue, json};

fn object(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn colors() -> Enumeration {
    Enumeration::new([
        Value::from("red"),
        Value::from("green"),
        Value::from("blue"),
        Value::Null,
    ])
}

fn shirts() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Shirt")
            .field(FieldDescriptor::new("color", FieldKind::Enumeration(colors())))
            .build()
            .unwrap(),
    )
}

#[test]
fn enumeration_derives_nullability_and_width() {
    let domain = colors();
    assert!(domain.nullable());
    assert_eq!(domain.max_length(), 5);

    let field = FieldDescriptor::new("color", FieldKind::Enumeration(domain));
    assert!(field.nullable);
    assert_eq!(field.max_length(), Some(5));

    let closed = Enumeration::new(["red", "green", "blue"]);
    assert!(!closed.nullable());
}

#[test]
fn enumeration_rejects_values_outside_domain() {
    let shirts = shirts();
    let shirt = deserialize(
        &shirts,
        &object(json!({"color": "red"})),
        &DeserializeOptions::default(),
    )
    .unwrap();
    assert_eq!(shirt.read("color").unwrap(), Value::from("red"));

    let err = deserialize(
        &shirts,
        &object(json!({"color": "purple"})),
        &DeserializeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, Error::InvalidEnumerationValue(Value::from("purple")));

    let shirt = deserialize(
        &shirts,
        &object(json!({"color": null})),
        &DeserializeOptions::default(),
    )
    .unwrap();
    assert_eq!(shirt.get("color"), Value::Null);
}

#[test]
fn enumeration_checks_stored_values_on_read() {
    let mut shirt = shirts().instantiate();
    shirt.set("color", Value::from("mauve"));

    let err = serialize(&shirt, &SerializeOptions::default()).unwrap_err();
    assert_eq!(err, Error::InvalidEnumerationValue(Value::from("mauve")));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Size {
    Small,
    Large,
}

impl EnumValue for Size {
    const VARIANTS: &'static [Self] = &[Size::Small, Size::Large];

    fn name(&self) -> &'static str {
        match self {
            Size::Small => "SMALL",
            Size::Large => "LARGE",
        }
    }

    fn value(&self) -> Value {
        match self {
            Size::Small => Value::Int(1),
            Size::Large => Value::Int(3),
        }
    }
}

#[test]
fn enumeration_built_from_rust_enum_stores_values_not_labels() {
    let schema = Arc::new(
        Schema::builder("Box")
            .field(FieldDescriptor::new(
                "size",
                FieldKind::Enumeration(Enumeration::of::<Size>()),
            ))
            .build()
            .unwrap(),
    );

    let record = deserialize(
        &schema,
        &object(json!({"size": Size::Large.value().to_json()})),
        &DeserializeOptions::default(),
    )
    .unwrap();
    assert_eq!(record.get("size"), Value::Int(3));

    let dumped = serialize(&record, &SerializeOptions::default()).unwrap();
    assert_eq!(dumped["size"], json!(3));

    let err = deserialize(
        &schema,
        &object(json!({"size": "LARGE"})),
        &DeserializeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, Error::InvalidEnumerationValue(Value::from("LARGE")));
}

#[test]
fn enumeration_label_is_not_a_member_value() {
    let schema = Arc::new(
        Schema::builder("Light")
            .field(FieldDescriptor::new(
                "color",
                FieldKind::Enumeration(Enumeration::labeled([("RED", "red"), ("GREEN", "green")])),
            ))
            .build()
            .unwrap(),
    );

    let err = deserialize(
        &schema,
        &object(json!({"color": "RED"})),
        &DeserializeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, Error::InvalidEnumerationValue(Value::from("RED")));
}

#[test]
fn enumeration_numbers_match_across_int_and_float() {
    let schema = Arc::new(
        Schema::builder("Dial")
            .field(FieldDescriptor::new(
                "step",
                FieldKind::Enumeration(Enumeration::new([0.5, 1.0])),
            ))
            .build()
            .unwrap(),
    );

    let record = deserialize(
        &schema,
        &object(json!({"step": 1})),
        &DeserializeOptions::default(),
    )
    .unwrap();
    assert_eq!(record.get("step"), Value::Float(1.0));
}

fn pets() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Pet")
            .auto_primary_key("id")
            .field(FieldDescriptor::new("name", FieldKind::Other))
            .foreign_key("owner", "User")
            .build()
            .unwrap(),
    )
}

#[test]
fn relation_and_shadow_share_one_catalog_entry() {
    let schema = pets();
    let fields = list_fields(&schema, CatalogOptions::default().foreign_keys(true));

    let owners: Vec<&str> = fields
        .iter()
        .filter(|f| f.key == "owner")
        .map(|f| f.attribute.as_str())
        .collect();
    assert_eq!(owners, ["owner"]);
    assert!(schema.descriptor_of("owner_id").is_some());
}

#[test]
fn foreign_keys_are_opt_in() {
    let schema = pets();
    let input = object(json!({"name": "Rex", "owner": 4}));

    let err = deserialize(&schema, &input, &DeserializeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidKeys(_)));

    let options = DeserializeOptions::default().foreign_keys(true);
    let pet = deserialize(&schema, &input, &options).unwrap();
    assert_eq!(pet.get("owner"), Value::Int(4));
    assert_eq!(pet.get("owner_id"), Value::Int(4));

    let dumped = serialize(&pet, &SerializeOptions::default()).unwrap();
    assert!(!dumped.contains_key("owner"));
}

#[test]
fn related_record_serializes_as_primary_key() {
    let users = Arc::new(
        Schema::builder("User")
            .auto_primary_key("id")
            .build()
            .unwrap(),
    );
    let mut user = users.instantiate();
    user.set("id", Value::Int(9));

    let mut pet = pets().instantiate();
    pet.write("name", Value::from("Rex")).unwrap();
    pet.write("owner", user.to_related().into()).unwrap();
    assert_eq!(pet.get("owner_id"), Value::Int(9));

    let dumped = serialize(&pet, &SerializeOptions::default().foreign_keys(true)).unwrap();
    assert_eq!(dumped, object(json!({"id": null, "name": "Rex", "owner": 9})));

    pet.patch_json(
        &object(json!({"owner": "12"})),
        &DeserializeOptions::default().foreign_keys(true),
    )
    .unwrap();
    assert_eq!(pet.get("owner_id"), Value::Int(12));
    assert_eq!(RelatedRecord::new("User", 9).primary_key(), &Value::Int(9));
}

#[test]
fn non_nullable_relation_rejects_null() {
    let err = deserialize(
        &pets(),
        &object(json!({"name": "Rex", "owner": null})),
        &DeserializeOptions::default().foreign_keys(true),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::FieldNotNullable(ref ctx) if ctx.field_type == FieldType::ForeignKey
    ));
}

#[cfg(feature = "argon2")]
mod passwords {
    use super::*;
    use jsonmodel::MIN_PASSWORD_LENGTH;

    fn logins() -> Arc<Schema> {
        Arc::new(
            Schema::builder("Login")
                .field(FieldDescriptor::new("user", FieldKind::Other))
                .field(FieldDescriptor::new(
                    "password",
                    FieldKind::PasswordHash(PasswordField::argon2()),
                ))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn short_plaintext_is_rejected() {
        let err = deserialize(
            &logins(),
            &object(json!({"user": "alice", "password": "short"})),
            &DeserializeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::PasswordTooShort {
                length: 5,
                minimum: MIN_PASSWORD_LENGTH,
            }
        );
        assert_eq!(MIN_PASSWORD_LENGTH, 8);
    }

    #[test]
    fn plaintext_is_hashed_and_verifiable() {
        let mut login = deserialize(
            &logins(),
            &object(json!({"user": "alice", "password": "longenough"})),
            &DeserializeOptions::default(),
        )
        .unwrap();

        let stored = login.get("password");
        assert_ne!(stored, Value::from("longenough"));

        let hash = login.password("password").unwrap().unwrap();
        assert!(hash.verify("longenough"));
        assert!(!hash.verify("wrong"));

        login.write("password", stored.clone()).unwrap();
        assert_eq!(login.get("password"), stored);
    }

    #[test]
    fn serialized_hash_round_trips_without_rehashing() {
        let logins = logins();
        let login = deserialize(
            &logins,
            &object(json!({"user": "alice", "password": "longenough"})),
            &DeserializeOptions::default(),
        )
        .unwrap();

        let dumped = serialize(&login, &SerializeOptions::default()).unwrap();
        let restored = deserialize(&logins, &dumped, &DeserializeOptions::default()).unwrap();
        assert_eq!(restored, login);

        let dumped = serialize(
            &login,
            &SerializeOptions::default().ignore(FieldType::PasswordHash),
        )
        .unwrap();
        assert_eq!(dumped, object(json!({"user": "alice"})));
    }

    #[test]
    fn rejected_password_leaves_patched_record_unchanged() {
        let mut login = deserialize(
            &logins(),
            &object(json!({"user": "alice", "password": "longenough"})),
            &DeserializeOptions::default(),
        )
        .unwrap();
        let before = login.clone();

        let err = patch(
            &mut login,
            &object(json!({"user": "mallory", "password": "short"})),
            &DeserializeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::PasswordTooShort { length: 5, .. }));
        assert_eq!(login.get("user"), Value::from("alice"));
        assert_eq!(login, before);
    }
}
