use crate::core::{PersistenceError, Result};
use crate::dto::{CriteriaTransferObject, DynamicResultSet, EntityResult, OperationType, PersistencePackage};
use crate::persistence::RecordHelper;
use async_trait::async_trait;
use std::sync::Arc;

/// Pluggable strategy implementing persist/retrieve for one category of
/// entity structure. Modules are stateless; each call receives the owning
/// [`RecordHelper`] for conversion, validation and DAO access.
#[async_trait]
pub trait PersistenceModule: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_compatible(&self, operation_type: OperationType) -> bool;

    async fn fetch(
        &self,
        helper: &RecordHelper,
        package: &PersistencePackage,
        cto: &CriteriaTransferObject,
    ) -> Result<DynamicResultSet>;

    async fn add(&self, helper: &RecordHelper, package: &PersistencePackage) -> Result<EntityResult>;

    async fn update(&self, helper: &RecordHelper, package: &PersistencePackage) -> Result<EntityResult>;

    async fn remove(&self, helper: &RecordHelper, package: &PersistencePackage) -> Result<()>;
}

/// Strategy-selection table keyed by operation type.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn PersistenceModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn register(&mut self, module: Arc<dyn PersistenceModule>) {
        self.modules.push(module);
    }

    /// The first registered module compatible with the operation type.
    pub fn get_compatible(&self, operation_type: OperationType) -> Result<Arc<dyn PersistenceModule>> {
        self.modules
            .iter()
            .find(|m| m.is_compatible(operation_type))
            .cloned()
            .ok_or_else(|| PersistenceError::NoCompatibleModule(operation_type.to_string()))
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
