use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-field violation messages keyed by wire field name. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation unless the field already has one; the first rule
    /// to complain about a field is the one the user sees.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records the outcome of a rule.
    pub fn check(&mut self, field: &str, violation: Option<&str>) {
        if let Some(message) = violation {
            self.insert(field, message);
        }
    }

    /// Drops the complaint for a field after its value changed.
    pub fn clear_field(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("password", "too short");
        errors.insert("password", "needs a digit");
        assert_eq!(errors.get("password"), Some("too short"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn check_ignores_passing_rules() {
        let mut errors = FieldErrors::new();
        errors.check("email", None);
        assert!(errors.is_empty());
        errors.check("email", Some("invalid"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn clear_field_reports_removal() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "invalid");
        assert!(errors.clear_field("email"));
        assert!(!errors.clear_field("email"));
        assert!(errors.is_empty());
    }

    #[test]
    fn deserializes_server_error_map() {
        let errors: FieldErrors =
            serde_json::from_str(r#"{"numero_documento":"ya registrado"}"#).unwrap();
        assert_eq!(errors.get("numero_documento"), Some("ya registrado"));
    }
}
