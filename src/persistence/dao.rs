use crate::core::{PersistenceError, Result, Value};
use crate::criteria::{matches_all, page_records, sort_records, FilterMapping};
use crate::dto::MergedProperties;
use crate::instance::{PersistentInstance, ARCHIVED_FLAG, ID_PROPERTY};
use crate::persistence::FieldManager;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Records for one registered entity class, keyed by stringified primary key.
#[derive(Debug, Default)]
struct EntityStore {
    records: BTreeMap<String, PersistentInstance>,
}

/// The persistence boundary: per-class record stores with individual locks
/// plus the per-class property metadata registry.
pub struct DynamicEntityDao {
    stores: RwLock<HashMap<String, Arc<RwLock<EntityStore>>>>,
    metadata: RwLock<HashMap<String, MergedProperties>>,
    field_manager: FieldManager,
}

impl Default for DynamicEntityDao {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicEntityDao {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
            metadata: RwLock::new(HashMap::new()),
            field_manager: FieldManager::new(),
        }
    }

    /// Register an entity class and its merged property metadata, creating an
    /// empty store for it. Re-registration replaces the metadata only.
    pub async fn register_class(
        &self,
        class_name: impl Into<String>,
        properties: MergedProperties,
    ) {
        let class_name = class_name.into();
        self.metadata
            .write()
            .await
            .insert(class_name.clone(), properties);
        self.stores
            .write()
            .await
            .entry(class_name)
            .or_insert_with(|| Arc::new(RwLock::new(EntityStore::default())));
    }

    pub async fn class_registered(&self, class_name: &str) -> bool {
        self.metadata.read().await.contains_key(class_name)
    }

    pub async fn get_merged_properties(&self, class_name: &str) -> Result<MergedProperties> {
        self.metadata
            .read()
            .await
            .get(class_name)
            .cloned()
            .ok_or_else(|| PersistenceError::ClassNotFound(class_name.to_string()))
    }

    async fn store(&self, class_name: &str) -> Result<Arc<RwLock<EntityStore>>> {
        self.stores
            .read()
            .await
            .get(class_name)
            .cloned()
            .ok_or_else(|| PersistenceError::ClassNotFound(class_name.to_string()))
    }

    pub async fn retrieve(&self, class_name: &str, id: &Value) -> Result<PersistentInstance> {
        let store = self.store(class_name).await?;
        let store = store.read().await;
        store
            .records
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| {
                PersistenceError::RecordNotFound(id.to_string(), class_name.to_string())
            })
    }

    /// All records satisfying every filter mapping, sorted per the mappings,
    /// bounded by first/max. Archived records are skipped unless asked for.
    pub async fn query(
        &self,
        class_name: &str,
        filter_mappings: &[FilterMapping],
        first_result: Option<usize>,
        max_results: Option<usize>,
        include_archived: bool,
    ) -> Result<Vec<PersistentInstance>> {
        let mut records = self
            .matching_records(class_name, filter_mappings, include_archived)
            .await?;
        sort_records(filter_mappings, &mut records, &self.field_manager);
        Ok(page_records(records, first_result, max_results))
    }

    /// Unpaged match count under the same filter mappings as [`query`].
    pub async fn count(
        &self,
        class_name: &str,
        filter_mappings: &[FilterMapping],
        include_archived: bool,
    ) -> Result<usize> {
        Ok(self
            .matching_records(class_name, filter_mappings, include_archived)
            .await?
            .len())
    }

    /// Largest value of `field` across matching records; NULL when none match.
    pub async fn max_value(
        &self,
        class_name: &str,
        filter_mappings: &[FilterMapping],
        field: &str,
    ) -> Result<Value> {
        let records = self
            .matching_records(class_name, filter_mappings, false)
            .await?;
        let mut max = Value::Null;
        for record in &records {
            let value = self
                .field_manager
                .get_field_value(record, field)
                .unwrap_or(Value::Null);
            if value.is_null() {
                continue;
            }
            if max.is_null() || value.compare(&max)? == std::cmp::Ordering::Greater {
                max = value;
            }
        }
        Ok(max)
    }

    async fn matching_records(
        &self,
        class_name: &str,
        filter_mappings: &[FilterMapping],
        include_archived: bool,
    ) -> Result<Vec<PersistentInstance>> {
        let store = self.store(class_name).await?;
        let store = store.read().await;
        let mut matched = Vec::new();
        for record in store.records.values() {
            if !include_archived && record.is_archived() {
                continue;
            }
            if matches_all(filter_mappings, record, &self.field_manager)? {
                matched.push(record.clone());
            }
        }
        debug!(
            "query on {}: {} of {} records matched",
            class_name,
            matched.len(),
            store.records.len()
        );
        Ok(matched)
    }

    /// Persist a new instance, generating a primary key when none is set.
    pub async fn persist(
        &self,
        class_name: &str,
        mut instance: PersistentInstance,
    ) -> Result<PersistentInstance> {
        let store = self.store(class_name).await?;
        let mut store = store.write().await;
        let id = match instance.id() {
            Some(id) => id.clone(),
            None => {
                let generated = Value::Text(Uuid::new_v4().to_string());
                instance.set_field(ID_PROPERTY, generated.clone());
                generated
            }
        };
        let key = id.to_string();
        if store.records.contains_key(&key) {
            return Err(PersistenceError::Service(format!(
                "duplicate primary key '{}' for {}",
                key, class_name
            )));
        }
        store.records.insert(key, instance.clone());
        Ok(instance)
    }

    /// Replace the stored record carrying the instance's primary key.
    pub async fn merge(
        &self,
        class_name: &str,
        instance: PersistentInstance,
    ) -> Result<PersistentInstance> {
        let store = self.store(class_name).await?;
        let mut store = store.write().await;
        let id = instance
            .id()
            .cloned()
            .ok_or_else(|| {
                PersistenceError::Service(format!("cannot merge {} without a primary key", class_name))
            })?;
        let key = id.to_string();
        if !store.records.contains_key(&key) {
            return Err(PersistenceError::RecordNotFound(key, class_name.to_string()));
        }
        store.records.insert(key, instance.clone());
        Ok(instance)
    }

    /// Remove a record. A non-destructive remove keeps the record and flags
    /// it archived instead.
    pub async fn remove(&self, class_name: &str, id: &Value, non_destructive: bool) -> Result<()> {
        let store = self.store(class_name).await?;
        let mut store = store.write().await;
        let key = id.to_string();
        if non_destructive {
            let record = store.records.get_mut(&key).ok_or_else(|| {
                PersistenceError::RecordNotFound(key.clone(), class_name.to_string())
            })?;
            record.set_field(ARCHIVED_FLAG, Value::Boolean(true));
            return Ok(());
        }
        if store.records.remove(&key).is_none() {
            return Err(PersistenceError::RecordNotFound(key, class_name.to_string()));
        }
        Ok(())
    }

    pub fn field_manager(&self) -> &FieldManager {
        &self.field_manager
    }
}
