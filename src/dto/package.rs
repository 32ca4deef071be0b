use crate::dto::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of persistence strategy a CRUD verb routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Basic,
    NonDestructiveRemove,
    Map,
    AdornedTargetList,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "BASIC",
            Self::NonDestructiveRemove => "NONDESTRUCTIVE_REMOVE",
            Self::Map => "MAP",
            Self::AdornedTargetList => "ADORNED_TARGET_LIST",
        };
        write!(f, "{}", name)
    }
}

/// Per-verb operation routing for one entity section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperationTypes {
    pub add: OperationType,
    pub update: OperationType,
    pub remove: OperationType,
    pub fetch: OperationType,
}

impl Default for OperationTypes {
    fn default() -> Self {
        Self {
            add: OperationType::Basic,
            update: OperationType::Basic,
            remove: OperationType::Basic,
            fetch: OperationType::Basic,
        }
    }
}

impl OperationTypes {
    pub fn uniform(op: OperationType) -> Self {
        Self {
            add: op,
            update: op,
            remove: op,
            fetch: op,
        }
    }
}

/// Contextual modifiers altering how properties are merged and filtered for
/// one admin section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistencePerspective {
    pub operation_types: OperationTypes,
    /// Properties surfaced to the UI but never copied onto instances.
    pub additional_non_persistent_properties: Vec<String>,
    pub show_archived: bool,
}

impl PersistencePerspective {
    pub fn new(operation_types: OperationTypes) -> Self {
        Self {
            operation_types,
            additional_non_persistent_properties: Vec::new(),
            show_archived: false,
        }
    }

    /// Include records flagged as archived in fetches and counts.
    pub fn with_archived(mut self) -> Self {
        self.show_archived = true;
        self
    }

    pub fn non_persistent(mut self, property: impl Into<String>) -> Self {
        self.additional_non_persistent_properties.push(property.into());
        self
    }

    pub fn is_non_persistent(&self, property: &str) -> bool {
        self.additional_non_persistent_properties
            .iter()
            .any(|p| p == property)
    }
}

/// How a list-grid fetch was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchType {
    #[default]
    Default,
    /// Large-grid fetch: ignore client sort, order by the configured property.
    LargeResultSet,
}

/// Full context for one CRUD request against a target entity class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistencePackage {
    pub ceiling_entity_classname: String,
    pub persistence_perspective: PersistencePerspective,
    pub entity: Option<Entity>,
    pub custom_criteria: Vec<String>,
    pub fetch_type: FetchType,
    /// Sort applied by [`FetchType::LargeResultSet`] refinement.
    pub refine_sort_property: Option<String>,
}

impl PersistencePackage {
    pub fn new(ceiling_entity_classname: impl Into<String>) -> Self {
        Self {
            ceiling_entity_classname: ceiling_entity_classname.into(),
            persistence_perspective: PersistencePerspective::default(),
            entity: None,
            custom_criteria: Vec::new(),
            fetch_type: FetchType::Default,
            refine_sort_property: None,
        }
    }

    pub fn with_perspective(mut self, perspective: PersistencePerspective) -> Self {
        self.persistence_perspective = perspective;
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_custom_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.custom_criteria.push(criteria.into());
        self
    }
}
