use crate::core::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Configuration for one property validator, addressed by registry name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfiguration {
    pub validator: String,
    pub config: BTreeMap<String, String>,
}

impl ValidationConfiguration {
    pub fn new(validator: impl Into<String>) -> Self {
        Self {
            validator: validator.into(),
            config: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Descriptor for a scalar persisted property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicFieldMetadata {
    pub field_type: FieldType,
    pub required: bool,
    pub read_only: bool,
    pub unique: bool,
    pub max_length: Option<usize>,
    pub friendly_name: Option<String>,
    pub validations: Vec<ValidationConfiguration>,
}

impl BasicFieldMetadata {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            read_only: false,
            unique: false,
            max_length: None,
            friendly_name: None,
            validations: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    pub fn validation(mut self, configuration: ValidationConfiguration) -> Self {
        self.validations.push(configuration);
        self
    }
}

/// Extra context for properties that live inside a map-structure collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapStructureMetadata {
    pub basic: BasicFieldMetadata,
    pub key_property: String,
    pub value_property: String,
}

/// Extra context for adorned-target-list collections: the join record carries
/// its own properties (sort order, adornments) alongside the target reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdornedTargetMetadata {
    pub basic: BasicFieldMetadata,
    pub sort_property: Option<String>,
}

/// Per-property descriptor. Basic covers scalar fields; the structural
/// variants mark properties managed by the map-structure and
/// adorned-target-list persistence modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldMetadata {
    Basic(BasicFieldMetadata),
    MapStructure(MapStructureMetadata),
    AdornedTargetList(AdornedTargetMetadata),
}

impl FieldMetadata {
    pub fn basic(field_type: FieldType) -> Self {
        Self::Basic(BasicFieldMetadata::new(field_type))
    }

    /// The scalar descriptor backing any variant.
    pub fn as_basic(&self) -> &BasicFieldMetadata {
        match self {
            Self::Basic(b) => b,
            Self::MapStructure(m) => &m.basic,
            Self::AdornedTargetList(a) => &a.basic,
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.as_basic().field_type
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Basic(_))
    }
}

/// Merged per-class property metadata, keyed by (possibly dotted) property
/// name.
pub type MergedProperties = HashMap<String, FieldMetadata>;
