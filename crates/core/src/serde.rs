//! Serde helper functions for form deserialization.
//!
//! These functions handle the quirks of HTML form submissions where
//! empty strings should be treated as None for optional fields.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating blank strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        default_email: Option<String>,
    }

    #[test]
    fn blank_string_is_none() {
        let form: Form = serde_json::from_str(r#"{"default_email": "   "}"#).unwrap();
        assert_eq!(form.default_email, None);
    }

    #[test]
    fn missing_field_is_none() {
        let form: Form = serde_json::from_str("{}").unwrap();
        assert_eq!(form.default_email, None);
    }

    #[test]
    fn value_is_trimmed() {
        let form: Form = serde_json::from_str(r#"{"default_email": " a@b.c "}"#).unwrap();
        assert_eq!(form.default_email.as_deref(), Some("a@b.c"));
    }
}
