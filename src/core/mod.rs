mod error;
mod field_type;
mod value;

pub use error::{PersistenceError, Result};
pub use field_type::FieldType;
pub use value::{Value, DATE_FORMAT};
