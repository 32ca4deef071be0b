use serde::{Deserialize, Serialize};

/// A single named value inside an [`Entity`](crate::dto::Entity). Values cross
/// the admin wire as strings; the property's metadata decides how the string
/// is parsed and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Option<String>,
    pub display_value: Option<String>,
    /// True once the value has been changed relative to the persisted state.
    pub is_dirty: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            display_value: None,
            is_dirty: false,
        }
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            display_value: None,
            is_dirty: false,
        }
    }

    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_property() {
        let p = Property::null("name");
        assert!(p.is_null());
        assert_eq!(p.value_str(), "");
    }
}
