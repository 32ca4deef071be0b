use dynadmin::{
    CriteriaTransferObject, DynamicEntityDao, FieldMetadata, FieldType, FilterAndSortCriteria,
    MergedProperties, PersistencePackage, PersistencePerspective, PersistentInstance,
    RecordHelper, Value,
};
use std::sync::Arc;

fn order_properties() -> MergedProperties {
    let mut props = MergedProperties::new();
    props.insert("id".into(), FieldMetadata::basic(FieldType::Id));
    props.insert("total".into(), FieldMetadata::basic(FieldType::Decimal));
    props.insert("status".into(), FieldMetadata::basic(FieldType::String));
    props
}

async fn seeded_helper(count: i64) -> RecordHelper {
    let dao = Arc::new(DynamicEntityDao::new());
    dao.register_class("com.acme.Order", order_properties()).await;
    let helper = RecordHelper::new(dao);
    for i in 1..=count {
        helper
            .dao()
            .persist(
                "com.acme.Order",
                PersistentInstance::new("com.acme.Order")
                    .with_field("id", i)
                    .with_field("total", (i * 10) as f64)
                    .with_field("status", if i % 2 == 0 { "SHIPPED" } else { "OPEN" }),
            )
            .await
            .unwrap();
    }
    helper
}

#[tokio::test]
async fn test_total_matches_unpaged_record_count() {
    let helper = seeded_helper(9).await;
    let cto = CriteriaTransferObject::new()
        .with(FilterAndSortCriteria::new("status").filter("OPEN"));
    let mappings = helper
        .get_filter_mappings(
            &PersistencePerspective::default(),
            &cto,
            "com.acme.Order",
            &order_properties(),
            None,
        )
        .unwrap();

    let total = helper
        .get_total_records("com.acme.Order", &mappings, false)
        .await
        .unwrap();
    let unpaged = helper
        .get_persistent_records("com.acme.Order", &mappings, None, None, false)
        .await
        .unwrap();
    assert_eq!(total, unpaged.len());
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_page_bounds() {
    let helper = seeded_helper(9).await;
    let page = helper
        .get_persistent_records("com.acme.Order", &[], Some(3), Some(4), false)
        .await
        .unwrap();
    assert_eq!(page.len(), 4);

    let tail = helper
        .get_persistent_records("com.acme.Order", &[], Some(8), Some(4), false)
        .await
        .unwrap();
    assert_eq!(tail.len(), 1);

    let beyond = helper
        .get_persistent_records("com.acme.Order", &[], Some(20), Some(4), false)
        .await
        .unwrap();
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn test_max_value() {
    let helper = seeded_helper(5).await;
    let max = helper
        .get_max_value("com.acme.Order", &[], "total")
        .await
        .unwrap();
    assert_eq!(max, Value::Decimal(50.0));

    let none = helper
        .get_max_value("com.acme.Order", &[], "missingField")
        .await
        .unwrap();
    assert!(none.is_null());
}

#[tokio::test]
async fn test_fetch_returns_page_and_total() {
    let helper = seeded_helper(9).await;
    let package = PersistencePackage::new("com.acme.Order");
    let cto = CriteriaTransferObject::new().paged(0, 4);

    let result_set = helper.fetch(&package, &cto).await.unwrap();
    assert_eq!(result_set.records.len(), 4);
    assert_eq!(result_set.page_size, 4);
    assert_eq!(result_set.total_records, 9);
    assert_eq!(result_set.start_index, 0);
}

#[tokio::test]
async fn test_fetch_applies_custom_criteria_refinement() {
    let helper = seeded_helper(9).await;
    let package = PersistencePackage::new("com.acme.Order").with_custom_criteria("status=OPEN");

    let result_set = helper
        .fetch(&package, &CriteriaTransferObject::new())
        .await
        .unwrap();
    assert_eq!(result_set.records.len(), 5);
    for record in &result_set.records {
        assert_eq!(record.find_property("status").unwrap().value_str(), "OPEN");
    }
}

#[tokio::test]
async fn test_fetch_filters_and_counts_consistently() {
    let helper = seeded_helper(9).await;
    let package = PersistencePackage::new("com.acme.Order");
    let cto = CriteriaTransferObject::new()
        .with(FilterAndSortCriteria::new("status").filter("SHIPPED"))
        .paged(0, 3);

    let result_set = helper.fetch(&package, &cto).await.unwrap();
    assert_eq!(result_set.total_records, 4);
    assert_eq!(result_set.records.len(), 3);
    for record in &result_set.records {
        assert_eq!(record.find_property("status").unwrap().value_str(), "SHIPPED");
    }
}
