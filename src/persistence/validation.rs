use crate::core::{PersistenceError, Result};
use crate::dto::{BasicFieldMetadata, Entity, FieldMetadata, MergedProperties};
use crate::instance::PersistentInstance;
use log::debug;
use lru::LruCache;
use regex::Regex;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

lazy_static::lazy_static! {
    static ref VALIDATOR_REGEX_CACHE: Arc<Mutex<LruCache<String, Arc<Regex>>>> =
        Arc::new(Mutex::new(LruCache::new(NonZeroUsize::new(100).unwrap())));
}

/// Outcome of one validator run against one property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValidationResult {
    Valid,
    Invalid(String),
}

impl PropertyValidationResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A pluggable per-property validator, addressed from metadata by registry
/// name through [`ValidationConfiguration`](crate::dto::ValidationConfiguration).
pub trait PropertyValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(
        &self,
        property_name: &str,
        submitted_value: Option<&str>,
        metadata: &BasicFieldMetadata,
        config: &BTreeMap<String, String>,
    ) -> PropertyValidationResult;
}

/// Rejects empty submissions for required properties.
pub struct RequiredPropertyValidator;

impl PropertyValidator for RequiredPropertyValidator {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate(
        &self,
        property_name: &str,
        submitted_value: Option<&str>,
        _metadata: &BasicFieldMetadata,
        _config: &BTreeMap<String, String>,
    ) -> PropertyValidationResult {
        match submitted_value {
            Some(v) if !v.is_empty() => PropertyValidationResult::Valid,
            _ => PropertyValidationResult::invalid(format!("{} is required", property_name)),
        }
    }
}

/// Enforces the metadata max length on string submissions.
pub struct MaxLengthPropertyValidator;

impl PropertyValidator for MaxLengthPropertyValidator {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn validate(
        &self,
        property_name: &str,
        submitted_value: Option<&str>,
        metadata: &BasicFieldMetadata,
        _config: &BTreeMap<String, String>,
    ) -> PropertyValidationResult {
        if let (Some(max), Some(value)) = (metadata.max_length, submitted_value) {
            if value.chars().count() > max {
                return PropertyValidationResult::invalid(format!(
                    "{} exceeds the maximum length of {}",
                    property_name, max
                ));
            }
        }
        PropertyValidationResult::Valid
    }
}

/// Checks the submission parses per the metadata field type.
pub struct FieldTypePropertyValidator;

impl PropertyValidator for FieldTypePropertyValidator {
    fn name(&self) -> &'static str {
        "fieldType"
    }

    fn validate(
        &self,
        property_name: &str,
        submitted_value: Option<&str>,
        metadata: &BasicFieldMetadata,
        _config: &BTreeMap<String, String>,
    ) -> PropertyValidationResult {
        if let Some(value) = submitted_value {
            if let Err(e) = metadata.field_type.parse_value(value) {
                return PropertyValidationResult::invalid(format!("{}: {}", property_name, e));
            }
        }
        PropertyValidationResult::Valid
    }
}

/// Matches the submission against the `regexExpression` config entry.
pub struct RegexPropertyValidator;

impl RegexPropertyValidator {
    fn compiled(pattern: &str) -> Result<Arc<Regex>> {
        let mut cache = VALIDATOR_REGEX_CACHE
            .lock()
            .map_err(|e| PersistenceError::Service(e.to_string()))?;
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Arc::new(
            Regex::new(pattern).map_err(|e| PersistenceError::Service(e.to_string()))?,
        );
        cache.put(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

impl PropertyValidator for RegexPropertyValidator {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn validate(
        &self,
        property_name: &str,
        submitted_value: Option<&str>,
        _metadata: &BasicFieldMetadata,
        config: &BTreeMap<String, String>,
    ) -> PropertyValidationResult {
        let Some(pattern) = config.get("regexExpression") else {
            return PropertyValidationResult::invalid(format!(
                "regex validator on {} is missing regexExpression",
                property_name
            ));
        };
        let Some(value) = submitted_value else {
            // NULL submissions are the required validator's concern
            return PropertyValidationResult::Valid;
        };
        match Self::compiled(pattern) {
            Ok(regex) if regex.is_match(value) => PropertyValidationResult::Valid,
            Ok(_) => PropertyValidationResult::invalid(
                config
                    .get("errorMessage")
                    .cloned()
                    .unwrap_or_else(|| format!("{} does not match the expected format", property_name)),
            ),
            Err(e) => PropertyValidationResult::invalid(e.to_string()),
        }
    }
}

/// Runs field-level validators against an entity, recording failures on the
/// entity itself. Implicit checks (required, max length, field type) always
/// run; additional validators are looked up by the names carried in metadata.
pub struct EntityValidatorService {
    validators: HashMap<&'static str, Box<dyn PropertyValidator>>,
}

impl Default for EntityValidatorService {
    fn default() -> Self {
        let mut service = Self {
            validators: HashMap::new(),
        };
        service.register(Box::new(RegexPropertyValidator));
        service
    }
}

impl EntityValidatorService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, validator: Box<dyn PropertyValidator>) {
        self.validators.insert(validator.name(), validator);
    }

    /// Validate `entity` against `merged_properties`. Errors are recorded on
    /// the entity; the return mirrors `!entity.is_validation_failure()`.
    ///
    /// When `validate_unsubmitted` is false, properties absent from the
    /// entity are skipped entirely.
    pub fn validate(
        &self,
        entity: &mut Entity,
        _instance: &PersistentInstance,
        merged_properties: &MergedProperties,
        validate_unsubmitted: bool,
    ) -> bool {
        for (property_name, metadata) in merged_properties {
            let FieldMetadata::Basic(basic) = metadata else {
                // Structural collections are validated by their own module
                continue;
            };
            if basic.read_only {
                continue;
            }

            let submitted = entity.find_property(property_name);
            if submitted.is_none() && !validate_unsubmitted {
                continue;
            }
            let value = submitted.and_then(|p| p.value.as_deref());
            let value_owned = value.map(|v| v.to_string());
            let value = value_owned.as_deref();

            let mut results = Vec::new();
            if basic.required {
                results.push(RequiredPropertyValidator.validate(
                    property_name,
                    value,
                    basic,
                    &BTreeMap::new(),
                ));
            }
            results.push(MaxLengthPropertyValidator.validate(
                property_name,
                value,
                basic,
                &BTreeMap::new(),
            ));
            results.push(FieldTypePropertyValidator.validate(
                property_name,
                value,
                basic,
                &BTreeMap::new(),
            ));

            for configuration in &basic.validations {
                match self.validators.get(configuration.validator.as_str()) {
                    Some(validator) => {
                        results.push(validator.validate(
                            property_name,
                            value,
                            basic,
                            &configuration.config,
                        ));
                    }
                    None => {
                        results.push(PropertyValidationResult::invalid(format!(
                            "unknown validator '{}' configured on {}",
                            configuration.validator, property_name
                        )));
                    }
                }
            }

            for result in results {
                if let PropertyValidationResult::Invalid(message) = result {
                    debug!("validation failed on {}.{}: {}", entity.entity_type, property_name, message);
                    entity.add_validation_error(property_name.clone(), message);
                }
            }
        }

        !entity.is_validation_failure()
    }
}
