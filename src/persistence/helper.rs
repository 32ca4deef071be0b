use crate::core::{FieldType, PersistenceError, Result, Value};
use crate::criteria::{FilterMapping, RestrictionFactory};
use crate::dto::{
    BasicFieldMetadata, CriteriaTransferObject, DynamicResultSet, Entity, EntityResult,
    FetchType, FieldMetadata, MergedProperties, OperationType, PersistencePackage,
    PersistencePerspective, Property,
};
use crate::instance::PersistentInstance;
use crate::persistence::modules::{
    AdornedTargetListPersistenceModule, BasicPersistenceModule, MapStructurePersistenceModule,
};
use crate::persistence::{
    DynamicEntityDao, EntityValidatorService, FieldManager, ModuleRegistry, PersistenceModule,
    PropertyValidator,
};
use crate::criteria::DefaultRestrictionFactory;
use log::{debug, warn};
use std::sync::Arc;

/// Translates between generic [`Entity`] DTOs and persisted
/// [`PersistentInstance`] records, validates, resolves filter criteria and
/// dispatches CRUD to the compatible persistence module.
///
/// Every operation is a stateless transformation over the context passed per
/// call; the helper itself only owns its collaborators.
///
/// # Examples
///
/// ```
/// use dynadmin::{
///     BasicFieldMetadata, DynamicEntityDao, Entity, FieldMetadata, FieldType,
///     MergedProperties, PersistencePackage, RecordHelper,
/// };
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let dao = Arc::new(DynamicEntityDao::new());
/// let mut properties = MergedProperties::new();
/// properties.insert("id".into(), FieldMetadata::basic(FieldType::Id));
/// properties.insert(
///     "name".into(),
///     FieldMetadata::Basic(BasicFieldMetadata::new(FieldType::String).required()),
/// );
/// dao.register_class("com.acme.Product", properties).await;
///
/// let helper = RecordHelper::new(dao);
/// let package = PersistencePackage::new("com.acme.Product")
///     .with_entity(Entity::new("com.acme.Product").with_property("name", "Widget"));
/// let result = helper.add(&package, false).await.unwrap();
/// assert_eq!(result.entity.find_property("name").unwrap().value_str(), "Widget");
/// # });
/// ```
pub struct RecordHelper {
    dao: Arc<DynamicEntityDao>,
    validator: EntityValidatorService,
    field_manager: FieldManager,
    default_restriction_factory: DefaultRestrictionFactory,
    modules: ModuleRegistry,
}

impl RecordHelper {
    pub fn new(dao: Arc<DynamicEntityDao>) -> Self {
        let mut modules = ModuleRegistry::new();
        modules.register(Arc::new(BasicPersistenceModule));
        modules.register(Arc::new(MapStructurePersistenceModule));
        modules.register(Arc::new(AdornedTargetListPersistenceModule));
        Self {
            dao,
            validator: EntityValidatorService::new(),
            field_manager: FieldManager::new(),
            default_restriction_factory: DefaultRestrictionFactory,
            modules,
        }
    }

    pub fn register_module(&mut self, module: Arc<dyn PersistenceModule>) {
        self.modules.register(module);
    }

    pub fn register_validator(&mut self, validator: Box<dyn PropertyValidator>) {
        self.validator.register(validator);
    }

    pub fn dao(&self) -> &DynamicEntityDao {
        &self.dao
    }

    pub fn get_field_manager(&self) -> &FieldManager {
        &self.field_manager
    }

    /// The persistence strategy appropriate to the operation kind.
    pub fn get_compatible_module(
        &self,
        operation_type: OperationType,
    ) -> Result<Arc<dyn PersistenceModule>> {
        self.modules.get_compatible(operation_type)
    }

    // ------------------------------------------------------------------
    // Criteria translation
    // ------------------------------------------------------------------

    /// Resolve user criteria into query-ready restrictions, keeping criteria
    /// submission order. Criteria naming unknown or non-persistent properties
    /// are skipped.
    pub fn get_filter_mappings(
        &self,
        perspective: &PersistencePerspective,
        cto: &CriteriaTransferObject,
        ceiling_entity: &str,
        merged_properties: &MergedProperties,
        custom_restriction_factory: Option<&dyn RestrictionFactory>,
    ) -> Result<Vec<FilterMapping>> {
        let factory: &dyn RestrictionFactory = custom_restriction_factory
            .unwrap_or(&self.default_restriction_factory);

        let mut mappings = Vec::new();
        for (order, criteria) in cto.criteria().iter().enumerate() {
            if perspective.is_non_persistent(&criteria.property_id) {
                continue;
            }
            let Some(metadata) = merged_properties.get(&criteria.property_id) else {
                warn!(
                    "criteria on unknown property {}.{} ignored",
                    ceiling_entity, criteria.property_id
                );
                continue;
            };
            mappings.push(FilterMapping {
                full_property_name: criteria.property_id.clone(),
                filter_values: criteria.filter_values.clone(),
                sort_direction: criteria.sort_direction,
                restriction: factory.get_restriction(&criteria.property_id, metadata),
                order,
            });
        }
        Ok(mappings)
    }

    // ------------------------------------------------------------------
    // Record conversion
    // ------------------------------------------------------------------

    /// Convert one persisted record into its DTO representation.
    ///
    /// `alternate_properties` are extracted from the record itself (join
    /// fields), while `path_to_target` navigates to the embedded instance the
    /// primary properties describe.
    pub fn get_record(
        &self,
        primary_properties: &MergedProperties,
        record: &PersistentInstance,
        alternate_properties: Option<&MergedProperties>,
        path_to_target: Option<&str>,
    ) -> Result<Entity> {
        let target = match path_to_target.filter(|p| !p.is_empty()) {
            Some(path) => self.field_manager.get_target(record, path).ok_or_else(|| {
                PersistenceError::FieldNotFound(path.to_string(), record.class_name.clone())
            })?,
            None => record,
        };

        let mut entity = Entity::new(target.class_name.clone());
        self.extract_properties(&mut entity, primary_properties, target);
        if let Some(alternate) = alternate_properties {
            self.extract_properties(&mut entity, alternate, record);
        }
        Ok(entity)
    }

    /// Convert a sequence of persisted records into DTOs.
    pub fn get_records(
        &self,
        primary_properties: &MergedProperties,
        records: &[PersistentInstance],
        alternate_properties: Option<&MergedProperties>,
        path_to_target: Option<&str>,
    ) -> Result<Vec<Entity>> {
        records
            .iter()
            .map(|r| self.get_record(primary_properties, r, alternate_properties, path_to_target))
            .collect()
    }

    /// Convert records for a registered class, resolving metadata through the
    /// DAO registry.
    pub async fn get_records_for_class(
        &self,
        ceiling_entity: &str,
        perspective: &PersistencePerspective,
        records: &[PersistentInstance],
    ) -> Result<Vec<Entity>> {
        let merged = self
            .get_simple_merged_properties(ceiling_entity, perspective)
            .await?;
        self.get_records(&merged, records, None, None)
    }

    /// Convert records after applying list-grid fetch refinement from the
    /// persistence package: custom criteria of the form `property=value` drop
    /// records whose field does not match, and a large-result-set fetch
    /// replaces the client sort with the configured property.
    pub fn get_refined_records(
        &self,
        primary_properties: &MergedProperties,
        records: &[PersistentInstance],
        alternate_properties: Option<&MergedProperties>,
        path_to_target: Option<&str>,
        package: &PersistencePackage,
    ) -> Result<Vec<Entity>> {
        let mut refined: Vec<PersistentInstance> = records.to_vec();
        for criteria in &package.custom_criteria {
            // Opaque marker strings carry no refinement and are left to the
            // modules
            let Some((property, expected)) = criteria.split_once('=') else {
                continue;
            };
            refined.retain(|record| {
                self.field_manager
                    .get_field_value(record, property)
                    .is_some_and(|value| value.to_string() == expected)
            });
        }
        if package.fetch_type == FetchType::LargeResultSet {
            if let Some(sort_property) = &package.refine_sort_property {
                refined.sort_by(|a, b| {
                    let va = self
                        .field_manager
                        .get_field_value(a, sort_property)
                        .unwrap_or(Value::Null);
                    let vb = self
                        .field_manager
                        .get_field_value(b, sort_property)
                        .unwrap_or(Value::Null);
                    va.compare(&vb).unwrap_or(std::cmp::Ordering::Equal)
                });
            }
        }
        self.get_records(primary_properties, &refined, alternate_properties, path_to_target)
    }

    fn extract_properties(
        &self,
        entity: &mut Entity,
        properties: &MergedProperties,
        source: &PersistentInstance,
    ) {
        // Metadata maps are unordered; emit properties in name order so grid
        // output is stable
        let mut names: Vec<&String> = properties.keys().collect();
        names.sort();
        for name in names {
            let metadata = &properties[name];
            if metadata.is_structural() {
                continue;
            }
            let value = self
                .field_manager
                .get_field_value(source, name)
                .unwrap_or(Value::Null);
            let mut property = if value.is_null() {
                Property::null(name.clone())
            } else {
                Property::new(name.clone(), value.to_string())
            };
            let raw = property.value_str().to_string();
            self.decorate_property(&mut property, &raw, metadata.as_basic());
            entity.add_property(property);
        }
    }

    /// Apply metadata-driven display formatting to a property.
    pub fn decorate_property(
        &self,
        property: &mut Property,
        value_string: &str,
        metadata: &BasicFieldMetadata,
    ) {
        if value_string.is_empty() {
            property.display_value = None;
            return;
        }
        property.display_value = match metadata.field_type.parse_value(value_string) {
            Ok(value) => Some(metadata.field_type.format_value(&value)),
            // Undecoratable values fall back to the raw string
            Err(_) => Some(value_string.to_string()),
        };
    }

    // ------------------------------------------------------------------
    // Population and validation
    // ------------------------------------------------------------------

    /// Copy the entity's submitted property values onto a fresh copy of
    /// `instance` per the metadata, validating first.
    ///
    /// On validation failure the passed instance is untouched and a
    /// validation error carrying the per-property messages is returned; the
    /// entity records the same messages.
    pub fn create_populated_instance(
        &self,
        instance: &PersistentInstance,
        entity: &mut Entity,
        merged_properties: &MergedProperties,
        set_id: bool,
        validate_unsubmitted: bool,
    ) -> Result<PersistentInstance> {
        if !self.validate(entity, instance, merged_properties, validate_unsubmitted) {
            return Err(PersistenceError::Validation {
                entity: entity.entity_type.clone(),
                errors: entity.validation_errors().clone(),
            });
        }

        let mut populated = instance.clone();
        let mut dirty_names: Vec<String> = Vec::new();
        for property in entity.properties() {
            let Some(metadata) = merged_properties.get(&property.name) else {
                warn!(
                    "submitted property {}.{} has no metadata and was ignored",
                    entity.entity_type, property.name
                );
                continue;
            };
            if metadata.is_structural() {
                continue;
            }
            let basic = metadata.as_basic();
            if basic.read_only {
                continue;
            }
            if basic.field_type == FieldType::Id && !set_id {
                continue;
            }
            let value = match &property.value {
                Some(raw) => basic.field_type.parse_value(raw)?,
                None => Value::Null,
            };
            let previous = self
                .field_manager
                .get_field_value(&populated, &property.name)
                .unwrap_or(Value::Null);
            if previous != value {
                dirty_names.push(property.name.clone());
            }
            self.field_manager
                .set_field_value(&mut populated, &property.name, value)?;
        }
        for name in dirty_names {
            if let Some(property) = entity.find_property_mut(&name) {
                property.is_dirty = true;
            }
        }
        Ok(populated)
    }

    /// Run field-level validators, recording failures on the entity. Returns
    /// the equivalent of `!entity.is_validation_failure()`.
    pub fn validate(
        &self,
        entity: &mut Entity,
        populated_instance: &PersistentInstance,
        merged_properties: &MergedProperties,
        validate_unsubmitted: bool,
    ) -> bool {
        entity.clear_validation_errors();
        self.validator.validate(
            entity,
            populated_instance,
            merged_properties,
            validate_unsubmitted,
        )
    }

    /// The typed primary key carried by the entity.
    pub fn get_primary_key(
        &self,
        entity: &Entity,
        merged_properties: &MergedProperties,
    ) -> Result<Value> {
        let (name, metadata) = merged_properties
            .iter()
            .find(|(_, md)| !md.is_structural() && md.field_type() == FieldType::Id)
            .ok_or_else(|| {
                PersistenceError::Service(format!(
                    "no id metadata registered for {}",
                    entity.entity_type
                ))
            })?;
        let raw = entity
            .find_property(name)
            .and_then(|p| p.value.as_deref())
            .ok_or_else(|| {
                PersistenceError::Service(format!(
                    "entity {} carries no primary key value in '{}'",
                    entity.entity_type, name
                ))
            })?;
        metadata.as_basic().field_type.parse_value(raw)
    }

    // ------------------------------------------------------------------
    // Metadata resolution
    // ------------------------------------------------------------------

    /// Merged property metadata for a registered class, extended with the
    /// perspective's non-persistent additions (surfaced read-only).
    pub async fn get_simple_merged_properties(
        &self,
        entity_name: &str,
        perspective: &PersistencePerspective,
    ) -> Result<MergedProperties> {
        let mut merged = self.dao.get_merged_properties(entity_name).await?;
        for name in &perspective.additional_non_persistent_properties {
            merged.entry(name.clone()).or_insert_with(|| {
                FieldMetadata::Basic(BasicFieldMetadata::new(FieldType::String).read_only())
            });
        }
        Ok(merged)
    }

    /// Metadata for a fetch, with structural properties foreign to the fetch
    /// operation filtered out. Resolution failures surface as service errors.
    pub async fn get_filtered_properties(
        &self,
        package: &PersistencePackage,
        cto: &CriteriaTransferObject,
    ) -> Result<MergedProperties> {
        let merged = self
            .get_simple_merged_properties(
                &package.ceiling_entity_classname,
                &package.persistence_perspective,
            )
            .await
            .map_err(|e| PersistenceError::Service(e.to_string()))?;

        let fetch_op = package.persistence_perspective.operation_types.fetch;
        let filtered: MergedProperties = merged
            .into_iter()
            .filter(|(_, md)| match md {
                FieldMetadata::Basic(_) => true,
                FieldMetadata::MapStructure(_) => fetch_op == OperationType::Map,
                FieldMetadata::AdornedTargetList(_) => {
                    fetch_op == OperationType::AdornedTargetList
                }
            })
            .collect();

        // Every filter criteria must resolve against the surviving metadata
        for criteria in cto.criteria() {
            if criteria.has_filter() && !filtered.contains_key(&criteria.property_id) {
                return Err(PersistenceError::Service(format!(
                    "filter property '{}' cannot be resolved for {}",
                    criteria.property_id, package.ceiling_entity_classname
                )));
            }
        }
        Ok(filtered)
    }

    // ------------------------------------------------------------------
    // Pagination and aggregates
    // ------------------------------------------------------------------

    /// Unpaged count of records matching the filter mappings.
    pub async fn get_total_records(
        &self,
        ceiling_entity: &str,
        filter_mappings: &[FilterMapping],
        include_archived: bool,
    ) -> Result<usize> {
        self.dao
            .count(ceiling_entity, filter_mappings, include_archived)
            .await
    }

    /// Largest value of `max_field` across matching records.
    pub async fn get_max_value(
        &self,
        ceiling_entity: &str,
        filter_mappings: &[FilterMapping],
        max_field: &str,
    ) -> Result<Value> {
        self.dao.max_value(ceiling_entity, filter_mappings, max_field).await
    }

    /// Matching persisted records, sorted per the mappings and bounded by
    /// first/max.
    pub async fn get_persistent_records(
        &self,
        ceiling_entity: &str,
        filter_mappings: &[FilterMapping],
        first_result: Option<usize>,
        max_results: Option<usize>,
        include_archived: bool,
    ) -> Result<Vec<PersistentInstance>> {
        self.dao
            .query(
                ceiling_entity,
                filter_mappings,
                first_result,
                max_results,
                include_archived,
            )
            .await
    }

    // ------------------------------------------------------------------
    // CRUD dispatch
    // ------------------------------------------------------------------

    /// Create the record described by the package's entity. Dispatches to the
    /// module compatible with the perspective's add operation type.
    pub async fn add(
        &self,
        package: &PersistencePackage,
        include_real_instance: bool,
    ) -> Result<EntityResult> {
        let module =
            self.get_compatible_module(package.persistence_perspective.operation_types.add)?;
        debug!(
            "add on {} via {}",
            package.ceiling_entity_classname,
            module.name()
        );
        let mut result = module
            .add(self, package)
            .await
            .map_err(service_failure)?;
        if !include_real_instance {
            result.instance = None;
        }
        Ok(result)
    }

    /// Update the record identified by the entity's primary key.
    pub async fn update(
        &self,
        package: &PersistencePackage,
        include_real_instance: bool,
    ) -> Result<EntityResult> {
        let module =
            self.get_compatible_module(package.persistence_perspective.operation_types.update)?;
        debug!(
            "update on {} via {}",
            package.ceiling_entity_classname,
            module.name()
        );
        let mut result = module
            .update(self, package)
            .await
            .map_err(service_failure)?;
        if !include_real_instance {
            result.instance = None;
        }
        Ok(result)
    }

    /// Remove the record identified by the entity's primary key. A
    /// non-destructive remove operation type archives instead of deleting.
    pub async fn remove(&self, package: &PersistencePackage) -> Result<()> {
        let module =
            self.get_compatible_module(package.persistence_perspective.operation_types.remove)?;
        debug!(
            "remove on {} via {}",
            package.ceiling_entity_classname,
            module.name()
        );
        module.remove(self, package).await.map_err(service_failure)
    }

    /// Fetch a page of records per the package and criteria.
    pub async fn fetch(
        &self,
        package: &PersistencePackage,
        cto: &CriteriaTransferObject,
    ) -> Result<DynamicResultSet> {
        let module =
            self.get_compatible_module(package.persistence_perspective.operation_types.fetch)?;
        module.fetch(self, package, cto).await.map_err(service_failure)
    }

    // ------------------------------------------------------------------
    // Reflective reads
    // ------------------------------------------------------------------

    /// String representation of the field at `property_name`, resolved from
    /// the root of `instance`. Fails like a missing accessor would.
    pub fn get_string_value_from_getter(
        &self,
        instance: &PersistentInstance,
        property_name: &str,
    ) -> Result<String> {
        self.field_manager.get_string_value(instance, property_name)
    }
}

/// Validation failures keep their shape; everything else surfaces to the
/// caller as a service failure.
fn service_failure(err: PersistenceError) -> PersistenceError {
    match err {
        e @ PersistenceError::Validation { .. } => e,
        e @ PersistenceError::Service(_) => e,
        e => PersistenceError::Service(e.to_string()),
    }
}
