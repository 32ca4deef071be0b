use crate::core::{PersistenceError, Result, Value};
use crate::dto::{
    CriteriaTransferObject, DynamicResultSet, EntityResult, FieldMetadata, FilterAndSortCriteria,
    MergedProperties, OperationType, PersistencePackage, Property, SortDirection,
};
use crate::persistence::modules::BasicPersistenceModule;
use crate::persistence::{PersistenceModule, RecordHelper};
use async_trait::async_trait;

/// Strategy for adorned-target-list collections: join records carry their own
/// maintained ordering alongside the target reference. New entries are
/// appended at the end of the sequence; fetches default to sequence order.
pub struct AdornedTargetListPersistenceModule;

impl AdornedTargetListPersistenceModule {
    fn adorned_metadata(merged: &MergedProperties) -> Result<&crate::dto::AdornedTargetMetadata> {
        merged
            .values()
            .find_map(|md| match md {
                FieldMetadata::AdornedTargetList(a) => Some(a),
                _ => None,
            })
            .ok_or_else(|| {
                PersistenceError::Service(
                    "adorned-target-list operation without adorned metadata".to_string(),
                )
            })
    }
}

#[async_trait]
impl PersistenceModule for AdornedTargetListPersistenceModule {
    fn name(&self) -> &'static str {
        "ADORNED_TARGET_LIST"
    }

    fn is_compatible(&self, operation_type: OperationType) -> bool {
        operation_type == OperationType::AdornedTargetList
    }

    async fn fetch(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
        cto: &CriteriaTransferObject,
    ) -> Result<DynamicResultSet> {
        let merged = helper
            .get_simple_merged_properties(
                &package.ceiling_entity_classname,
                &package.persistence_perspective,
            )
            .await?;
        let adorned = Self::adorned_metadata(&merged)?;

        // Sequence order is the default when the client sorts nothing
        let client_sorts = cto
            .criteria()
            .iter()
            .any(|c| c.sort_direction.is_some());
        let mut cto = cto.clone();
        if !client_sorts {
            if let Some(sort_property) = adorned.sort_property.clone() {
                let mut criteria = cto
                    .get(&sort_property)
                    .cloned()
                    .unwrap_or_else(|| FilterAndSortCriteria::new(sort_property));
                criteria.sort_direction = Some(SortDirection::Ascending);
                cto.add(criteria);
            }
        }
        BasicPersistenceModule.fetch(helper, package, &cto).await
    }

    async fn add(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
    ) -> Result<EntityResult> {
        let mut entity = BasicPersistenceModule::required_entity(package)?;
        let ceiling = &package.ceiling_entity_classname;
        let merged = helper
            .get_simple_merged_properties(ceiling, &package.persistence_perspective)
            .await?;
        let adorned = Self::adorned_metadata(&merged)?;

        if let Some(sort_property) = &adorned.sort_property {
            let submitted = entity
                .find_property(sort_property)
                .is_some_and(|p| !p.is_null());
            if !submitted {
                let current_max = helper.get_max_value(ceiling, &[], sort_property).await?;
                let next = match current_max {
                    Value::Null => 1,
                    v => v.as_i64().unwrap_or(0) + 1,
                };
                entity.add_property(Property::new(sort_property.clone(), next.to_string()));
            }
        }

        BasicPersistenceModule
            .add(helper, &package.clone().with_entity(entity))
            .await
    }

    async fn update(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
    ) -> Result<EntityResult> {
        BasicPersistenceModule.update(helper, package).await
    }

    async fn remove(&self, helper: &RecordHelper, package: &PersistencePackage) -> Result<()> {
        BasicPersistenceModule.remove(helper, package).await
    }
}
