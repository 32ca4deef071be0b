mod dao;
mod field_manager;
mod helper;
mod module;
pub mod modules;
mod validation;

pub use dao::DynamicEntityDao;
pub use field_manager::FieldManager;
pub use helper::RecordHelper;
pub use module::{ModuleRegistry, PersistenceModule};
pub use validation::{
    EntityValidatorService, FieldTypePropertyValidator, MaxLengthPropertyValidator,
    PropertyValidationResult, PropertyValidator, RegexPropertyValidator,
    RequiredPropertyValidator,
};
