use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter and sort state for one property, as submitted by the grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterAndSortCriteria {
    pub property_id: String,
    pub filter_values: Vec<String>,
    pub sort_direction: Option<SortDirection>,
}

impl FilterAndSortCriteria {
    pub fn new(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            filter_values: Vec::new(),
            sort_direction: None,
        }
    }

    pub fn filter(mut self, value: impl Into<String>) -> Self {
        self.filter_values.push(value.into());
        self
    }

    pub fn sort(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    pub fn has_filter(&self) -> bool {
        self.filter_values.iter().any(|v| !v.is_empty())
    }
}

/// User-specified filter, sort and paging state for one fetch. Criteria keep
/// submission order so restrictions apply deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriteriaTransferObject {
    criteria: Vec<FilterAndSortCriteria>,
    pub first_result: Option<usize>,
    pub max_results: Option<usize>,
}

impl CriteriaTransferObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, criteria: FilterAndSortCriteria) {
        if let Some(existing) = self
            .criteria
            .iter_mut()
            .find(|c| c.property_id == criteria.property_id)
        {
            *existing = criteria;
        } else {
            self.criteria.push(criteria);
        }
    }

    pub fn with(mut self, criteria: FilterAndSortCriteria) -> Self {
        self.add(criteria);
        self
    }

    pub fn paged(mut self, first_result: usize, max_results: usize) -> Self {
        self.first_result = Some(first_result);
        self.max_results = Some(max_results);
        self
    }

    pub fn get(&self, property_id: &str) -> Option<&FilterAndSortCriteria> {
        self.criteria.iter().find(|c| c.property_id == property_id)
    }

    pub fn criteria(&self) -> &[FilterAndSortCriteria] {
        &self.criteria
    }
}
