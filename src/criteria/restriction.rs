use crate::core::{FieldType, PersistenceError, Result, Value};
use lru::LruCache;
use regex::Regex;
use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

lazy_static::lazy_static! {
    static ref FILTER_REGEX_CACHE: Arc<Mutex<LruCache<String, Arc<Regex>>>> =
        Arc::new(Mutex::new(LruCache::new(NonZeroUsize::new(200).unwrap())));
}

/// Convert a grid LIKE pattern into an anchored regex. `%` matches any run,
/// `_` a single character; everything else is literal.
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                regex.push_str(&regex::escape(&chars[i].to_string()));
            }
            c if ".*+?^${}()|[]\\".contains(c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
        i += 1;
    }

    regex.push('$');
    regex
}

fn like_matches(text: &str, pattern: &str) -> Result<bool> {
    // Plain patterns are a case-insensitive contains, no regex needed
    if !pattern.contains('%') && !pattern.contains('_') {
        return Ok(text.to_lowercase().contains(&pattern.to_lowercase()));
    }

    let key = format!("(?i){}", like_to_regex(pattern));
    let compiled = {
        let mut cache = FILTER_REGEX_CACHE
            .lock()
            .map_err(|e| PersistenceError::Criteria(e.to_string()))?;
        if let Some(regex) = cache.get(&key) {
            regex.clone()
        } else {
            let regex = Arc::new(
                Regex::new(&key).map_err(|e| PersistenceError::Criteria(e.to_string()))?,
            );
            cache.put(key, regex.clone());
            regex
        }
    };
    Ok(compiled.is_match(text))
}

type PredicateFn = dyn Fn(&Value, &[String]) -> Result<bool> + Send + Sync;

/// A named predicate deciding whether a field value satisfies the submitted
/// filter values.
#[derive(Clone)]
pub struct Restriction {
    name: &'static str,
    predicate: Arc<PredicateFn>,
}

impl std::fmt::Debug for Restriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Restriction").field("name", &self.name).finish()
    }
}

impl Restriction {
    pub fn new<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&Value, &[String]) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, value: &Value, filter_values: &[String]) -> Result<bool> {
        (self.predicate)(value, filter_values)
    }

    /// Case-insensitive LIKE over text fields. Multiple filter values OR.
    pub fn string_like() -> Self {
        Self::new("STRING_LIKE", |value, filters| {
            let text = value.to_string();
            if value.is_null() {
                return Ok(false);
            }
            for f in filters {
                if like_matches(&text, f)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// Exact match after parsing each filter value per the field type.
    /// Multiple filter values OR.
    pub fn exact(field_type: FieldType) -> Self {
        Self::new("EXACT", move |value, filters| {
            for f in filters {
                let target = field_type.parse_value(f)?;
                if value == &target {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// Single value is equality; two values form an inclusive min..max range.
    /// Used by numeric and date fields.
    pub fn range(field_type: FieldType) -> Self {
        Self::new("RANGE", move |value, filters| {
            let bounds: Vec<&String> = filters.iter().filter(|f| !f.is_empty()).collect();
            match bounds.len() {
                0 => Ok(true),
                1 => {
                    let target = field_type.parse_value(bounds[0])?;
                    Ok(value == &target)
                }
                2 => {
                    let min = field_type.parse_value(bounds[0])?;
                    let max = field_type.parse_value(bounds[1])?;
                    if value.is_null() {
                        return Ok(false);
                    }
                    Ok(value.compare(&min)? != Ordering::Less
                        && value.compare(&max)? != Ordering::Greater)
                }
                n => Err(PersistenceError::Criteria(format!(
                    "Range restriction takes at most 2 bounds, got {}",
                    n
                ))),
            }
        })
    }

    /// Boolean equality, accepting the admin wire aliases (Y/N/1/0).
    pub fn boolean_eq() -> Self {
        Self::exact(FieldType::Boolean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_plain_contains() {
        assert!(like_matches("Widget Deluxe", "deluxe").unwrap());
        assert!(!like_matches("Widget", "gadget").unwrap());
    }

    #[test]
    fn test_like_wildcards() {
        assert!(like_matches("Widget", "Wid%").unwrap());
        assert!(like_matches("Widget", "W_dget").unwrap());
        assert!(!like_matches("Widget", "get%").unwrap());
    }

    #[test]
    fn test_range_two_bounds() {
        let r = Restriction::range(FieldType::Integer);
        let filters = vec!["10".to_string(), "20".to_string()];
        assert!(r.matches(&Value::Integer(15), &filters).unwrap());
        assert!(!r.matches(&Value::Integer(25), &filters).unwrap());
        assert!(!r.matches(&Value::Null, &filters).unwrap());
    }

    #[test]
    fn test_exact_multiple_values_or() {
        let r = Restriction::exact(FieldType::Integer);
        let filters = vec!["1".to_string(), "3".to_string()];
        assert!(r.matches(&Value::Integer(3), &filters).unwrap());
        assert!(!r.matches(&Value::Integer(2), &filters).unwrap());
    }
}
