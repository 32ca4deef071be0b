use crate::core::{PersistenceError, Result, Value};
use crate::instance::PersistentInstance;

/// Resolves dotted property paths (`defaultCategory.name`) against the
/// dynamic field table of a [`PersistentInstance`]. This replaces the
/// reflection walk a JVM admin layer would do with getter/setter lookup.
#[derive(Debug, Default, Clone)]
pub struct FieldManager;

impl FieldManager {
    pub fn new() -> Self {
        Self
    }

    /// Read the value at `path`. None when any path segment is missing.
    pub fn get_field_value(&self, instance: &PersistentInstance, path: &str) -> Option<Value> {
        let (target, field) = self.resolve(instance, path)?;
        target.field(field).cloned()
    }

    /// Read the value at `path`, failing the way a missing getter would.
    pub fn get_string_value(&self, instance: &PersistentInstance, path: &str) -> Result<String> {
        let (target, field) = self.resolve(instance, path).ok_or_else(|| {
            PersistenceError::FieldNotFound(path.to_string(), instance.class_name.clone())
        })?;
        match target.field(field) {
            Some(value) => Ok(value.to_string()),
            None => Err(PersistenceError::NoSuchGetter(
                field.to_string(),
                target.class_name.clone(),
            )),
        }
    }

    /// Write `value` at `path`. Intermediate segments must already exist as
    /// embedded instances.
    pub fn set_field_value(
        &self,
        instance: &mut PersistentInstance,
        path: &str,
        value: Value,
    ) -> Result<()> {
        match path.rsplit_once('.') {
            None => {
                instance.set_field(path, value);
                Ok(())
            }
            Some((prefix, field)) => {
                let class_name = instance.class_name.clone();
                let mut current = instance;
                for segment in prefix.split('.') {
                    current = current.embedded_mut(segment).ok_or_else(|| {
                        PersistenceError::FieldNotFound(path.to_string(), class_name.clone())
                    })?;
                }
                current.set_field(field, value);
                Ok(())
            }
        }
    }

    /// Navigate to the embedded instance at `path` (no trailing field).
    pub fn get_target<'a>(
        &self,
        instance: &'a PersistentInstance,
        path: &str,
    ) -> Option<&'a PersistentInstance> {
        let mut current = instance;
        for segment in path.split('.') {
            current = current.embedded(segment)?;
        }
        Some(current)
    }

    /// Split `path` into its owning instance and trailing field name.
    /// None only when an intermediate embedded segment is missing.
    fn resolve<'a, 'b>(
        &self,
        instance: &'a PersistentInstance,
        path: &'b str,
    ) -> Option<(&'a PersistentInstance, &'b str)> {
        match path.rsplit_once('.') {
            None => Some((instance, path)),
            Some((prefix, field)) => {
                let target = self.get_target(instance, prefix)?;
                Some((target, field))
            }
        }
    }
}
