//! Storage-request form and its validation.
//!
//! Both the client (before sending) and the server (before persisting) run
//! the same checks so a bad form never reaches the database.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewStorageRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image_code: String,
    #[serde(default)]
    pub reason: String,
}

/// A form that passed validation: trimmed, email lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStorageRequest {
    pub email: String,
    pub image_code: String,
    pub reason: String,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex"))
}

impl NewStorageRequest {
    pub fn validate(&self) -> Result<ValidStorageRequest, ValidationError> {
        let email = self.email.trim();
        let image_code = self.image_code.trim();
        let reason = self.reason.trim();

        if email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if image_code.is_empty() {
            return Err(ValidationError::MissingField("imageCode"));
        }
        if reason.is_empty() {
            return Err(ValidationError::MissingField("reason"));
        }
        if !email_pattern().is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(ValidStorageRequest {
            email: email.to_lowercase(),
            image_code: image_code.to_string(),
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, code: &str, reason: &str) -> NewStorageRequest {
        NewStorageRequest {
            email: email.into(),
            image_code: code.into(),
            reason: reason.into(),
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_lowercased() {
        let valid = form("  Someone@Example.COM ", " S-12 ", " keep it ")
            .validate()
            .unwrap();
        assert_eq!(valid.email, "someone@example.com");
        assert_eq!(valid.image_code, "S-12");
        assert_eq!(valid.reason, "keep it");
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            form("", "S-1", "r").validate(),
            Err(ValidationError::MissingField("email"))
        );
        assert_eq!(
            form("a@b.co", "   ", "r").validate(),
            Err(ValidationError::MissingField("imageCode"))
        );
        assert_eq!(
            form("a@b.co", "S-1", "\n").validate(),
            Err(ValidationError::MissingField("reason"))
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["plain", "a@b", "@b.co", "a b@c.de", "a@@b.co"] {
            assert_eq!(
                form(bad, "S-1", "r").validate(),
                Err(ValidationError::InvalidEmail),
                "{bad} should be rejected"
            );
        }
    }
}
