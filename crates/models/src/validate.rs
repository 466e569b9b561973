//! Field validators shared by the create and update payloads.
//!
//! Messages follow the wording clients already parse, keyed by field name.
use std::collections::BTreeMap;

use crate::errors::ModelError;

pub const MISSING: &str = "Missing data for required field.";
pub const EMPTY: &str = "Field may not be empty.";
pub const BAD_EMAIL: &str = "Not a valid email address.";
pub const UNKNOWN: &str = "Unknown field.";

#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, Vec<String>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.entry(field.to_string()).or_default().push(message.into());
        self
    }

    pub fn text(&mut self, field: &str, value: &str, max_len: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, EMPTY);
        } else if value.chars().count() > max_len {
            self.push(field, format!("Longer than maximum length {max_len}."));
        }
        self
    }

    pub fn opt_text(&mut self, field: &str, value: Option<&str>, max_len: usize) -> &mut Self {
        if let Some(v) = value {
            self.text(field, v, max_len);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_email(value) {
            self.push(field, BAD_EMAIL);
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.push(field, "Must be greater than or equal to 0.");
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: i64) -> &mut Self {
        if value < 1 {
            self.push(field, "Must be greater than or equal to 1.");
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ModelError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Fields(self.errors))
        }
    }
}

pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_email("ann@shop.example"));
        assert!(!is_email("ann@localhost"));
        assert!(!is_email("ann shop@example.com"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("a@b@example.com"));
    }

    #[test]
    fn collects_messages_per_field() {
        let mut v = Validator::new();
        v.text("name", "  ", 100).email("email", "nope").non_negative("price", -1.0);
        match v.finish() {
            Err(ModelError::Fields(map)) => {
                assert_eq!(map["name"], vec![EMPTY.to_string()]);
                assert_eq!(map["email"], vec![BAD_EMAIL.to_string()]);
                assert!(map.contains_key("price"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn max_length_counts_chars() {
        let mut v = Validator::new();
        v.text("vin", "ÅÅÅ", 3);
        assert!(v.is_empty());
        v.text("vin", "ABCD", 3);
        assert!(!v.is_empty());
    }
}
