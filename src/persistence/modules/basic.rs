use crate::core::{PersistenceError, Result};
use crate::dto::{
    CriteriaTransferObject, DynamicResultSet, Entity, EntityResult, OperationType,
    PersistencePackage,
};
use crate::instance::PersistentInstance;
use crate::persistence::{PersistenceModule, RecordHelper};
use async_trait::async_trait;

/// Default strategy for flat entity structures. Also services
/// non-destructive removes, which archive instead of deleting.
pub struct BasicPersistenceModule;

impl BasicPersistenceModule {
    pub(crate) fn required_entity(package: &PersistencePackage) -> Result<Entity> {
        package.entity.clone().ok_or_else(|| {
            PersistenceError::Service(format!(
                "persistence package for {} carries no entity payload",
                package.ceiling_entity_classname
            ))
        })
    }
}

#[async_trait]
impl PersistenceModule for BasicPersistenceModule {
    fn name(&self) -> &'static str {
        "BASIC"
    }

    fn is_compatible(&self, operation_type: OperationType) -> bool {
        matches!(
            operation_type,
            OperationType::Basic | OperationType::NonDestructiveRemove
        )
    }

    async fn fetch(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
        cto: &CriteriaTransferObject,
    ) -> Result<DynamicResultSet> {
        let ceiling = &package.ceiling_entity_classname;
        let merged = helper.get_filtered_properties(package, cto).await?;
        let mappings = helper.get_filter_mappings(
            &package.persistence_perspective,
            cto,
            ceiling,
            &merged,
            None,
        )?;
        let include_archived = package.persistence_perspective.show_archived;
        let total = helper
            .get_total_records(ceiling, &mappings, include_archived)
            .await?;
        let records = helper
            .get_persistent_records(
                ceiling,
                &mappings,
                cto.first_result,
                cto.max_results,
                include_archived,
            )
            .await?;
        let entities = helper.get_refined_records(&merged, &records, None, None, package)?;
        Ok(DynamicResultSet::new(
            entities,
            total,
            cto.first_result.unwrap_or(0),
        ))
    }

    async fn add(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
    ) -> Result<EntityResult> {
        let mut entity = Self::required_entity(package)?;
        let merged = helper
            .get_simple_merged_properties(
                &package.ceiling_entity_classname,
                &package.persistence_perspective,
            )
            .await?;
        let instance = PersistentInstance::new(&package.ceiling_entity_classname);
        // New records validate the full metadata so required fields cannot be
        // skipped by omission
        let populated = helper.create_populated_instance(&instance, &mut entity, &merged, true, true)?;
        let saved = helper
            .dao()
            .persist(&package.ceiling_entity_classname, populated)
            .await?;
        let result_entity = helper.get_record(&merged, &saved, None, None)?;
        Ok(EntityResult::new(result_entity).with_instance(saved))
    }

    async fn update(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
    ) -> Result<EntityResult> {
        let mut entity = Self::required_entity(package)?;
        let merged = helper
            .get_simple_merged_properties(
                &package.ceiling_entity_classname,
                &package.persistence_perspective,
            )
            .await?;
        let id = helper.get_primary_key(&entity, &merged)?;
        let existing = helper
            .dao()
            .retrieve(&package.ceiling_entity_classname, &id)
            .await?;
        // Partial updates only validate what was submitted
        let populated =
            helper.create_populated_instance(&existing, &mut entity, &merged, false, false)?;
        let saved = helper
            .dao()
            .merge(&package.ceiling_entity_classname, populated)
            .await?;
        let result_entity = helper.get_record(&merged, &saved, None, None)?;
        Ok(EntityResult::new(result_entity).with_instance(saved))
    }

    async fn remove(&self, helper: &RecordHelper, package: &PersistencePackage) -> Result<()> {
        let entity = Self::required_entity(package)?;
        let merged = helper
            .get_simple_merged_properties(
                &package.ceiling_entity_classname,
                &package.persistence_perspective,
            )
            .await?;
        let id = helper.get_primary_key(&entity, &merged)?;
        let non_destructive = package.persistence_perspective.operation_types.remove
            == OperationType::NonDestructiveRemove;
        helper
            .dao()
            .remove(&package.ceiling_entity_classname, &id, non_destructive)
            .await
    }
}
