// ============================================================================
// dynadmin Library
// ============================================================================

pub mod core;
pub mod criteria;
pub mod dto;
pub mod instance;
pub mod persistence;

// Re-export main types for convenience
pub use core::{FieldType, PersistenceError, Result, Value};
pub use criteria::{DefaultRestrictionFactory, FilterMapping, Restriction, RestrictionFactory};
pub use dto::{
    AdornedTargetMetadata, BasicFieldMetadata, CriteriaTransferObject, DynamicResultSet, Entity,
    EntityResult, FetchType, FieldMetadata, FilterAndSortCriteria, MapStructureMetadata,
    MergedProperties, OperationType, OperationTypes, PersistencePackage, PersistencePerspective,
    Property, SortDirection, ValidationConfiguration,
};
pub use instance::{PersistentInstance, ARCHIVED_FLAG, ID_PROPERTY};
pub use persistence::{
    DynamicEntityDao, EntityValidatorService, FieldManager, PersistenceModule,
    PropertyValidationResult, PropertyValidator, RecordHelper,
};
