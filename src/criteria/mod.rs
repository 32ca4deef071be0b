mod factory;
mod filter_mapping;
mod restriction;

pub use factory::{DefaultRestrictionFactory, RestrictionFactory};
pub use filter_mapping::{matches_all, page_records, sort_records, FilterMapping};
pub use restriction::Restriction;
