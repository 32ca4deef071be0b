use crate::dto::Entity;
use crate::instance::PersistentInstance;
use serde::{Deserialize, Serialize};

/// One page of converted records plus the unpaged total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicResultSet {
    pub records: Vec<Entity>,
    pub total_records: usize,
    pub start_index: usize,
    pub page_size: usize,
}

impl DynamicResultSet {
    pub fn new(records: Vec<Entity>, total_records: usize, start_index: usize) -> Self {
        let page_size = records.len();
        Self {
            records,
            total_records,
            start_index,
            page_size,
        }
    }
}

/// Outcome of an add or update, optionally carrying the persisted instance
/// when the caller asked for the real object back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityResult {
    pub entity: Entity,
    pub instance: Option<PersistentInstance>,
}

impl EntityResult {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: PersistentInstance) -> Self {
        self.instance = Some(instance);
        self
    }
}
