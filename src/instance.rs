use crate::core::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Primary key property name shared by every dynamic record.
pub const ID_PROPERTY: &str = "id";

/// Archive marker set by non-destructive removes.
pub const ARCHIVED_FLAG: &str = "archiveStatus";

/// A persisted domain record: a metadata-described bag of typed fields plus
/// embedded sub-records reachable through dotted property paths
/// (`defaultCategory.name`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentInstance {
    pub class_name: String,
    fields: HashMap<String, Value>,
    embedded: HashMap<String, PersistentInstance>,
}

impl PersistentInstance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: HashMap::new(),
            embedded: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value.into());
        self
    }

    pub fn with_embedded(mut self, name: impl Into<String>, instance: PersistentInstance) -> Self {
        self.embedded.insert(name.into(), instance);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn embedded(&self, name: &str) -> Option<&PersistentInstance> {
        self.embedded.get(name)
    }

    pub fn embedded_mut(&mut self, name: &str) -> Option<&mut PersistentInstance> {
        self.embedded.get_mut(name)
    }

    pub fn set_embedded(&mut self, name: impl Into<String>, instance: PersistentInstance) {
        self.embedded.insert(name.into(), instance);
    }

    pub fn id(&self) -> Option<&Value> {
        self.fields.get(ID_PROPERTY).filter(|v| !v.is_null())
    }

    pub fn is_archived(&self) -> bool {
        matches!(self.fields.get(ARCHIVED_FLAG), Some(Value::Boolean(true)))
    }
}
