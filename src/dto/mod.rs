mod criteria;
mod entity;
mod metadata;
mod package;
mod property;
mod result;

pub use criteria::{CriteriaTransferObject, FilterAndSortCriteria, SortDirection};
pub use entity::Entity;
pub use metadata::{
    AdornedTargetMetadata, BasicFieldMetadata, FieldMetadata, MapStructureMetadata,
    MergedProperties, ValidationConfiguration,
};
pub use package::{
    FetchType, OperationType, OperationTypes, PersistencePackage, PersistencePerspective,
};
pub use property::Property;
pub use result::{DynamicResultSet, EntityResult};
