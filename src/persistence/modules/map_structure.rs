use crate::core::{PersistenceError, Result};
use crate::criteria::{FilterMapping, Restriction};
use crate::dto::{
    CriteriaTransferObject, DynamicResultSet, EntityResult, FieldMetadata, MergedProperties,
    OperationType, PersistencePackage,
};
use crate::persistence::modules::BasicPersistenceModule;
use crate::persistence::{PersistenceModule, RecordHelper};
use async_trait::async_trait;

/// Strategy for map-structure collections: each record is one map entry, and
/// the key property must stay unique within the entry class.
pub struct MapStructurePersistenceModule;

impl MapStructurePersistenceModule {
    fn map_metadata(merged: &MergedProperties) -> Result<(&str, &str)> {
        merged
            .values()
            .find_map(|md| match md {
                FieldMetadata::MapStructure(m) => {
                    Some((m.key_property.as_str(), m.value_property.as_str()))
                }
                _ => None,
            })
            .ok_or_else(|| {
                PersistenceError::Service(
                    "map-structure operation without map metadata".to_string(),
                )
            })
    }

    /// Records in the entry class carrying the submitted key, excluding the
    /// record with `exclude_id` when given.
    async fn key_conflicts(
        helper: &RecordHelper,
        ceiling: &str,
        merged: &MergedProperties,
        key_property: &str,
        submitted_key: &str,
        exclude_id: Option<&crate::core::Value>,
    ) -> Result<bool> {
        let key_type = merged
            .get(key_property)
            .map(|md| md.field_type())
            .ok_or_else(|| {
                PersistenceError::Service(format!(
                    "map key property '{}' is not part of {}",
                    key_property, ceiling
                ))
            })?;
        let mapping = FilterMapping {
            full_property_name: key_property.to_string(),
            filter_values: vec![submitted_key.to_string()],
            sort_direction: None,
            restriction: Restriction::exact(key_type),
            order: 0,
        };
        let matches = helper
            .get_persistent_records(ceiling, &[mapping], None, None, false)
            .await?;
        Ok(matches
            .iter()
            .any(|record| exclude_id.is_none_or(|id| record.id() != Some(id))))
    }
}

#[async_trait]
impl PersistenceModule for MapStructurePersistenceModule {
    fn name(&self) -> &'static str {
        "MAP_STRUCTURE"
    }

    fn is_compatible(&self, operation_type: OperationType) -> bool {
        operation_type == OperationType::Map
    }

    async fn fetch(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
        cto: &CriteriaTransferObject,
    ) -> Result<DynamicResultSet> {
        BasicPersistenceModule.fetch(helper, package, cto).await
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
        let (key_property, _) = Self::map_metadata(&merged)?;

        let submitted_key = entity
            .find_property(key_property)
            .and_then(|p| p.value.clone());
        match submitted_key {
            None => {
                entity.add_validation_error(key_property, "map key is required");
            }
            Some(key) => {
                if Self::key_conflicts(helper, ceiling, &merged, key_property, &key, None).await? {
                    entity.add_validation_error(
                        key_property,
                        format!("an entry with key '{}' already exists", key),
                    );
                }
            }
        }
        if entity.is_validation_failure() {
            return Err(PersistenceError::Validation {
                entity: entity.entity_type.clone(),
                errors: entity.validation_errors().clone(),
            });
        }

        BasicPersistenceModule
            .add(
                helper,
                &package.clone().with_entity(entity),
            )
            .await
    }

    async fn update(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
    ) -> Result<EntityResult> {
        let mut entity = BasicPersistenceModule::required_entity(package)?;
        let ceiling = &package.ceiling_entity_classname;
        let merged = helper
            .get_simple_merged_properties(ceiling, &package.persistence_perspective)
            .await?;
        let (key_property, _) = Self::map_metadata(&merged)?;
        let id = helper.get_primary_key(&entity, &merged)?;

        if let Some(key) = entity.find_property(key_property).and_then(|p| p.value.clone()) {
            if Self::key_conflicts(helper, ceiling, &merged, key_property, &key, Some(&id)).await? {
                entity.add_validation_error(
                    key_property,
                    format!("an entry with key '{}' already exists", key),
                );
                return Err(PersistenceError::Validation {
                    entity: entity.entity_type.clone(),
                    errors: entity.validation_errors().clone(),
                });
            }
        }

        BasicPersistenceModule
            .update(helper, &package.clone().with_entity(entity))
            .await
    }

    async fn remove(&self, helper: &RecordHelper, package: &PersistencePackage) -> Result<()> {
        BasicPersistenceModule.remove(helper, package).await
    }
}
