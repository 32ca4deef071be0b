use crate::dto::Property;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generic DTO representation of a persisted record. Properties keep their
/// insertion order for stable grid rendering; lookup is by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    properties: Vec<Property>,
    validation_errors: BTreeMap<String, Vec<String>>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            properties: Vec::new(),
            validation_errors: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_property(Property::new(name, value));
        self
    }

    /// Adds or replaces the property with the same name.
    pub fn add_property(&mut self, property: Property) {
        if let Some(existing) = self
            .properties
            .iter_mut()
            .find(|p| p.name == property.name)
        {
            *existing = property;
        } else {
            self.properties.push(property);
        }
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn find_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    pub fn add_validation_error(&mut self, property: impl Into<String>, message: impl Into<String>) {
        self.validation_errors
            .entry(property.into())
            .or_default()
            .push(message.into());
    }

    pub fn validation_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.validation_errors
    }

    pub fn clear_validation_errors(&mut self) {
        self.validation_errors.clear();
    }

    pub fn is_validation_failure(&self) -> bool {
        !self.validation_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_property_replaces_by_name() {
        let mut e = Entity::new("com.acme.Product");
        e.add_property(Property::new("name", "Widget"));
        e.add_property(Property::new("name", "Gadget"));
        assert_eq!(e.properties().len(), 1);
        assert_eq!(e.find_property("name").unwrap().value_str(), "Gadget");
    }

    #[test]
    fn test_validation_failure_flag() {
        let mut e = Entity::new("com.acme.Product");
        assert!(!e.is_validation_failure());
        e.add_validation_error("name", "name is required");
        assert!(e.is_validation_failure());
        e.clear_validation_errors();
        assert!(!e.is_validation_failure());
    }
}
