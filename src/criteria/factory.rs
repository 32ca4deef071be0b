use crate::core::FieldType;
use crate::criteria::Restriction;
use crate::dto::FieldMetadata;

/// Strategy for binding a property's metadata to the restriction used when
/// filtering on it. The default maps by field type; callers may supply their
/// own factory for custom filter semantics.
pub trait RestrictionFactory: Send + Sync {
    fn get_restriction(&self, property_name: &str, metadata: &FieldMetadata) -> Restriction;
}

#[derive(Debug, Default)]
pub struct DefaultRestrictionFactory;

impl RestrictionFactory for DefaultRestrictionFactory {
    fn get_restriction(&self, _property_name: &str, metadata: &FieldMetadata) -> Restriction {
        let field_type = metadata.field_type();
        match field_type {
            FieldType::String => Restriction::string_like(),
            FieldType::Boolean => Restriction::boolean_eq(),
            FieldType::Integer | FieldType::Decimal | FieldType::Money | FieldType::Date => {
                Restriction::range(field_type)
            }
            FieldType::Id | FieldType::ForeignKey => Restriction::exact(field_type),
        }
    }
}
