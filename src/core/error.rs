use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Validation failure for '{entity}': {errors:?}")]
    Validation {
        entity: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("Service error: {0}")]
    Service(String),

    #[error("Class '{0}' is not registered")]
    ClassNotFound(String),

    #[error("Field '{0}' not found on '{1}'")]
    FieldNotFound(String, String),

    #[error("No getter for property '{0}' on '{1}'")]
    NoSuchGetter(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Record '{0}' not found in '{1}'")]
    RecordNotFound(String, String),

    #[error("No persistence module compatible with operation type '{0}'")]
    NoCompatibleModule(String),

    #[error("Criteria error: {0}")]
    Criteria(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

impl PersistenceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
