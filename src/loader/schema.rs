// Dinner list schema
// Optional shape check applied after parsing when strict mode is on

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How loaded data is checked before it is handed to the caller
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// Any JSON value is accepted as-is
    #[default]
    Passthrough,
    /// The value must be a list of dinners
    Strict,
}

/// One planned dinner, as accepted by strict mode
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Dinner {
    pub name: String,
    pub date: String,
    /// Any other fields are allowed and kept
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode `value` as a dinner list, returning the decoder error on mismatch
pub fn validate(value: &Value) -> Result<Vec<Dinner>, serde_json::Error> {
    Vec::<Dinner>::deserialize(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_list() {
        let value = json!([
            {"name": "Tacos", "date": "2024-01-01"},
            {"name": "Ramen", "date": "2024-01-02", "guests": 4}
        ]);
        let dinners = validate(&value).unwrap();
        assert_eq!(dinners.len(), 2);
        assert_eq!(dinners[0].name, "Tacos");
        assert_eq!(dinners[1].extra.get("guests"), Some(&json!(4)));
    }

    #[test]
    fn test_object_rejected() {
        assert!(validate(&json!({})).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        assert!(validate(&json!([{"name": "Tacos"}])).is_err());
        assert!(validate(&json!([{"name": "Tacos", "date": 20240101}])).is_err());
    }

    #[test]
    fn test_mode_from_config_string() {
        let mode: SchemaMode = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(mode, SchemaMode::Strict);
        assert_eq!(SchemaMode::default(), SchemaMode::Passthrough);
    }
}
