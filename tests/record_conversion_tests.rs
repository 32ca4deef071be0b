use dynadmin::{
    BasicFieldMetadata, DynamicEntityDao, FetchType, FieldMetadata, FieldType, MergedProperties,
    PersistencePackage, PersistentInstance, RecordHelper,
};
use std::sync::Arc;

fn product_properties() -> MergedProperties {
    let mut props = MergedProperties::new();
    props.insert("id".into(), FieldMetadata::basic(FieldType::Id));
    props.insert("name".into(), FieldMetadata::basic(FieldType::String));
    props.insert(
        "price".into(),
        FieldMetadata::basic(FieldType::Money),
    );
    props.insert("active".into(), FieldMetadata::basic(FieldType::Boolean));
    props
}

async fn helper() -> RecordHelper {
    let dao = Arc::new(DynamicEntityDao::new());
    dao.register_class("com.acme.Product", product_properties())
        .await;
    RecordHelper::new(dao)
}

fn widget() -> PersistentInstance {
    PersistentInstance::new("com.acme.Product")
        .with_field("id", 1i64)
        .with_field("name", "Widget")
        .with_field("price", 12.5f64)
        .with_field("active", true)
}

#[tokio::test]
async fn test_get_record_extracts_all_properties() {
    let helper = helper().await;
    let entity = helper
        .get_record(&product_properties(), &widget(), None, None)
        .unwrap();

    assert_eq!(entity.entity_type, "com.acme.Product");
    assert_eq!(entity.find_property("name").unwrap().value_str(), "Widget");
    assert_eq!(entity.find_property("price").unwrap().value_str(), "12.5");
    assert_eq!(entity.find_property("active").unwrap().value_str(), "true");
}

#[tokio::test]
async fn test_money_property_is_decorated() {
    let helper = helper().await;
    let entity = helper
        .get_record(&product_properties(), &widget(), None, None)
        .unwrap();
    assert_eq!(
        entity.find_property("price").unwrap().display_value.as_deref(),
        Some("12.50")
    );
}

#[tokio::test]
async fn test_missing_field_becomes_null_property() {
    let helper = helper().await;
    let bare = PersistentInstance::new("com.acme.Product").with_field("id", 2i64);
    let entity = helper
        .get_record(&product_properties(), &bare, None, None)
        .unwrap();
    assert!(entity.find_property("name").unwrap().is_null());
}

#[tokio::test]
async fn test_path_to_target_extracts_embedded_instance() {
    let helper = helper().await;
    let mut category_props = MergedProperties::new();
    category_props.insert("name".into(), FieldMetadata::basic(FieldType::String));

    let category = PersistentInstance::new("com.acme.Category").with_field("name", "Tools");
    let product = widget().with_embedded("defaultCategory", category);

    let entity = helper
        .get_record(&category_props, &product, None, Some("defaultCategory"))
        .unwrap();
    assert_eq!(entity.entity_type, "com.acme.Category");
    assert_eq!(entity.find_property("name").unwrap().value_str(), "Tools");
}

#[tokio::test]
async fn test_alternate_properties_come_from_root_record() {
    let helper = helper().await;
    let mut category_props = MergedProperties::new();
    category_props.insert("name".into(), FieldMetadata::basic(FieldType::String));
    let mut join_props = MergedProperties::new();
    join_props.insert("displayOrder".into(), FieldMetadata::basic(FieldType::Integer));

    let category = PersistentInstance::new("com.acme.Category").with_field("name", "Tools");
    let join = PersistentInstance::new("com.acme.CategoryXref")
        .with_field("displayOrder", 4i64)
        .with_embedded("category", category);

    let entity = helper
        .get_record(&category_props, &join, Some(&join_props), Some("category"))
        .unwrap();
    assert_eq!(entity.find_property("name").unwrap().value_str(), "Tools");
    assert_eq!(
        entity.find_property("displayOrder").unwrap().value_str(),
        "4"
    );
}

#[tokio::test]
async fn test_unknown_path_is_an_error() {
    let helper = helper().await;
    let err = helper.get_record(&product_properties(), &widget(), None, Some("missing"));
    assert!(err.is_err());
}

#[tokio::test]
async fn test_get_records_converts_in_order() {
    let helper = helper().await;
    let records = vec![
        widget(),
        PersistentInstance::new("com.acme.Product")
            .with_field("id", 2i64)
            .with_field("name", "Gadget"),
    ];
    let entities = helper
        .get_records(&product_properties(), &records, None, None)
        .unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].find_property("name").unwrap().value_str(), "Widget");
    assert_eq!(entities[1].find_property("name").unwrap().value_str(), "Gadget");
}

#[tokio::test]
async fn test_refined_records_apply_large_grid_sort() {
    let helper = helper().await;
    let records = vec![
        PersistentInstance::new("com.acme.Product")
            .with_field("id", 1i64)
            .with_field("name", "Zulu"),
        PersistentInstance::new("com.acme.Product")
            .with_field("id", 2i64)
            .with_field("name", "Alpha"),
    ];

    let mut package = PersistencePackage::new("com.acme.Product");
    package.fetch_type = FetchType::LargeResultSet;
    package.refine_sort_property = Some("name".into());

    let entities = helper
        .get_refined_records(&product_properties(), &records, None, None, &package)
        .unwrap();
    assert_eq!(entities[0].find_property("name").unwrap().value_str(), "Alpha");
    assert_eq!(entities[1].find_property("name").unwrap().value_str(), "Zulu");
}

#[tokio::test]
async fn test_refined_records_apply_custom_criteria() {
    let helper = helper().await;
    let records = vec![
        widget(),
        PersistentInstance::new("com.acme.Product")
            .with_field("id", 2i64)
            .with_field("name", "Gadget"),
    ];

    let package =
        PersistencePackage::new("com.acme.Product").with_custom_criteria("name=Gadget");
    let entities = helper
        .get_refined_records(&product_properties(), &records, None, None, &package)
        .unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].find_property("name").unwrap().value_str(), "Gadget");

    // Marker strings without a property=value shape refine nothing
    let marker = PersistencePackage::new("com.acme.Product").with_custom_criteria("auditView");
    let all = helper
        .get_refined_records(&product_properties(), &records, None, None, &marker)
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_get_records_for_class_uses_registered_metadata() {
    let helper = helper().await;
    let perspective = dynadmin::PersistencePerspective::default();
    let entities = helper
        .get_records_for_class("com.acme.Product", &perspective, &[widget()])
        .await
        .unwrap();
    assert_eq!(entities.len(), 1);

    let missing = helper
        .get_records_for_class("com.acme.Unknown", &perspective, &[widget()])
        .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_string_value_from_getter() {
    let helper = helper().await;
    let category = PersistentInstance::new("com.acme.Category").with_field("name", "Tools");
    let product = widget().with_embedded("defaultCategory", category);

    assert_eq!(
        helper
            .get_string_value_from_getter(&product, "defaultCategory.name")
            .unwrap(),
        "Tools"
    );
    assert!(helper
        .get_string_value_from_getter(&product, "defaultCategory.missing")
        .is_err());
    assert!(helper
        .get_string_value_from_getter(&product, "nothere.name")
        .is_err());
}

#[test]
fn test_metadata_builder_defaults() {
    let md = BasicFieldMetadata::new(FieldType::String);
    assert!(!md.required);
    assert!(md.max_length.is_none());
}
