use crate::core::{Result, Value};
use crate::criteria::Restriction;
use crate::dto::SortDirection;
use crate::instance::PersistentInstance;
use crate::persistence::FieldManager;
use std::cmp::Ordering;

/// A user criteria element resolved against metadata and bound to a query
/// restriction. Mappings keep the criteria submission order.
#[derive(Debug, Clone)]
pub struct FilterMapping {
    pub full_property_name: String,
    pub filter_values: Vec<String>,
    pub sort_direction: Option<SortDirection>,
    pub restriction: Restriction,
    /// Position within the originating criteria, for deterministic sorting.
    pub order: usize,
}

impl FilterMapping {
    pub fn has_filter(&self) -> bool {
        self.filter_values.iter().any(|v| !v.is_empty())
    }

    pub fn matches(&self, instance: &PersistentInstance, field_manager: &FieldManager) -> Result<bool> {
        if !self.has_filter() {
            return Ok(true);
        }
        // Unresolvable paths filter like NULL rather than erroring the fetch
        let value = field_manager
            .get_field_value(instance, &self.full_property_name)
            .unwrap_or(Value::Null);
        self.restriction.matches(&value, &self.filter_values)
    }
}

/// Conjunction of all mapping restrictions.
pub fn matches_all(
    mappings: &[FilterMapping],
    instance: &PersistentInstance,
    field_manager: &FieldManager,
) -> Result<bool> {
    for mapping in mappings {
        if !mapping.matches(instance, field_manager)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Sort records by every mapping that carries a sort direction, in mapping
/// order. NULL values sort last regardless of direction.
pub fn sort_records(
    mappings: &[FilterMapping],
    records: &mut [PersistentInstance],
    field_manager: &FieldManager,
) {
    let mut sorts: Vec<&FilterMapping> =
        mappings.iter().filter(|m| m.sort_direction.is_some()).collect();
    sorts.sort_by_key(|m| m.order);
    if sorts.is_empty() {
        return;
    }

    records.sort_by(|a, b| {
        for mapping in &sorts {
            let va = field_manager
                .get_field_value(a, &mapping.full_property_name)
                .unwrap_or(Value::Null);
            let vb = field_manager
                .get_field_value(b, &mapping.full_property_name)
                .unwrap_or(Value::Null);
            let ord = va.compare(&vb).unwrap_or(Ordering::Equal);
            let ord = match mapping.sort_direction {
                Some(SortDirection::Descending) if !va.is_null() && !vb.is_null() => ord.reverse(),
                _ => ord,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Apply first/max paging bounds to an already filtered, sorted record list.
pub fn page_records(
    records: Vec<PersistentInstance>,
    first_result: Option<usize>,
    max_results: Option<usize>,
) -> Vec<PersistentInstance> {
    let start = first_result.unwrap_or(0);
    records
        .into_iter()
        .skip(start)
        .take(max_results.unwrap_or(usize::MAX))
        .collect()
}
