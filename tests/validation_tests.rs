use dynadmin::{
    BasicFieldMetadata, DynamicEntityDao, Entity, FieldMetadata, FieldType, MergedProperties,
    PersistenceError, PersistentInstance, RecordHelper, ValidationConfiguration,
};
use std::sync::Arc;

fn product_properties() -> MergedProperties {
    let mut props = MergedProperties::new();
    props.insert("id".into(), FieldMetadata::basic(FieldType::Id));
    props.insert(
        "name".into(),
        FieldMetadata::Basic(
            BasicFieldMetadata::new(FieldType::String)
                .required()
                .max_length(20),
        ),
    );
    props.insert(
        "sku".into(),
        FieldMetadata::Basic(BasicFieldMetadata::new(FieldType::String).validation(
            ValidationConfiguration::new("regex").with("regexExpression", "^[A-Z]{3}-\\d+$"),
        )),
    );
    props.insert("price".into(), FieldMetadata::basic(FieldType::Money));
    props.insert(
        "internalCode".into(),
        FieldMetadata::Basic(BasicFieldMetadata::new(FieldType::String).read_only()),
    );
    props
}

async fn helper() -> RecordHelper {
    let dao = Arc::new(DynamicEntityDao::new());
    dao.register_class("com.acme.Product", product_properties())
        .await;
    RecordHelper::new(dao)
}

#[tokio::test]
async fn test_validate_mirrors_failure_flag() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product");

    let mut good = Entity::new("com.acme.Product").with_property("name", "Widget");
    let passed = helper.validate(&mut good, &instance, &product_properties(), false);
    assert!(passed);
    assert_eq!(passed, !good.is_validation_failure());

    let mut bad = Entity::new("com.acme.Product").with_property("sku", "nope");
    let passed = helper.validate(&mut bad, &instance, &product_properties(), false);
    assert!(!passed);
    assert_eq!(passed, !bad.is_validation_failure());
}

#[tokio::test]
async fn test_populate_round_trips_values() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product");
    let mut entity = Entity::new("com.acme.Product")
        .with_property("name", "Widget")
        .with_property("sku", "ABC-42")
        .with_property("price", "12.5");

    let populated = helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), false, false)
        .unwrap();
    let back = helper
        .get_record(&product_properties(), &populated, None, None)
        .unwrap();

    for name in ["name", "sku", "price"] {
        assert_eq!(
            back.find_property(name).unwrap().value,
            entity.find_property(name).unwrap().value,
            "property {} did not round-trip",
            name
        );
    }
}

#[tokio::test]
async fn test_failed_validation_leaves_instance_unchanged() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product").with_field("name", "Original");
    let before = instance.clone();

    let mut entity = Entity::new("com.acme.Product")
        .with_property("name", "a name far longer than the twenty character limit");
    let err = helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), false, false)
        .unwrap_err();

    assert!(err.is_validation());
    assert!(entity.is_validation_failure());
    assert_eq!(instance, before);
}

#[tokio::test]
async fn test_validation_error_carries_messages() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product");
    let mut entity = Entity::new("com.acme.Product").with_property("price", "not-a-number");

    let err = helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), false, false)
        .unwrap_err();
    match err {
        PersistenceError::Validation { entity: name, errors } => {
            assert_eq!(name, "com.acme.Product");
            assert!(errors.contains_key("price"));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_only_properties_are_not_populated() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product");
    let mut entity = Entity::new("com.acme.Product")
        .with_property("name", "Widget")
        .with_property("internalCode", "SHOULD-NOT-STICK");

    let populated = helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), false, false)
        .unwrap();
    assert!(populated.field("internalCode").is_none());
}

#[tokio::test]
async fn test_id_only_set_when_requested() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product");
    let mut entity = Entity::new("com.acme.Product")
        .with_property("id", "7")
        .with_property("name", "Widget");

    let without_id = helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), false, false)
        .unwrap();
    assert!(without_id.id().is_none());

    let with_id = helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), true, false)
        .unwrap();
    assert_eq!(with_id.id(), Some(&dynadmin::Value::Integer(7)));
}

#[tokio::test]
async fn test_unsubmitted_required_enforced_only_on_full_validation() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product");

    // name (required) not submitted: partial validation passes
    let mut entity = Entity::new("com.acme.Product").with_property("sku", "ABC-1");
    assert!(helper.validate(&mut entity, &instance, &product_properties(), false));
    // full validation rejects the omission
    assert!(!helper.validate(&mut entity, &instance, &product_properties(), true));
}

#[tokio::test]
async fn test_population_marks_changed_properties_dirty() {
    let helper = helper().await;
    let instance = PersistentInstance::new("com.acme.Product")
        .with_field("name", "Widget")
        .with_field("price", 10.0);
    let mut entity = Entity::new("com.acme.Product")
        .with_property("name", "Widget")
        .with_property("price", "20");

    helper
        .create_populated_instance(&instance, &mut entity, &product_properties(), false, false)
        .unwrap();
    assert!(entity.find_property("price").unwrap().is_dirty);
    // Resubmitting the stored value is not a change
    assert!(!entity.find_property("name").unwrap().is_dirty);
}

#[tokio::test]
async fn test_get_primary_key() {
    let helper = helper().await;
    let entity = Entity::new("com.acme.Product")
        .with_property("id", "42")
        .with_property("name", "Widget");
    let key = helper.get_primary_key(&entity, &product_properties()).unwrap();
    assert_eq!(key, dynadmin::Value::Integer(42));

    let keyless = Entity::new("com.acme.Product").with_property("name", "Widget");
    assert!(helper.get_primary_key(&keyless, &product_properties()).is_err());
}
