use lettre::Address;
use serde_json::Value;

use crate::prelude::*;

/// The four contact form fields as they travel over the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    /// Whether every field has something other than whitespace in it.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.subject, &self.message].iter().all(|f| !f.trim().is_empty())
    }
}

/// A validated contact form submission. Lives for exactly one request.
#[derive(Clone, Debug)]
pub struct ContactSubmission {
    pub name: String,
    pub email: Address,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    /// Validate a JSON request body.
    ///
    /// Checks run in order: every field present as a non-blank string, the sender is none of
    /// `owners`, the sender is a well-formed address.
    pub fn parse(body: &Value, owners: &[String]) -> AppResult<Self> {
        let field = |key: &str| -> AppResult<String> {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned)
                .ok_or(AppError::MissingFields)
        };
        let name = field("name")?;
        let email = field("email")?;
        let subject = field("subject")?;
        let message = field("message")?;

        let email = email.trim();
        if owners.iter().any(|owner| email.eq_ignore_ascii_case(owner)) {
            return Err(AppError::OwnerAddress);
        }
        let email = email.parse::<Address>().map_err(|_| AppError::InvalidAddress)?;

        Ok(Self { name, email, subject, message })
    }

    /// Subject shared by the notification and the acknowledgment.
    pub fn subject_line(&self) -> String {
        // Header values must stay on one line.
        format!("New message from {}: {}", self.name, self.subject)
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn owner() -> Vec<String> {
        vec!["owner@site.test".to_string()]
    }

    fn ada() -> Value {
        json!({ "name": "Ada", "email": "ada@example.com", "subject": "Hello", "message": "Hi there" })
    }

    #[test]
    fn accepts_complete_submission() {
        let s = ContactSubmission::parse(&ada(), &owner()).unwrap();
        assert_eq!(s.name, "Ada");
        assert_eq!(s.email.to_string(), "ada@example.com");
        assert_eq!(s.subject, "Hello");
        assert_eq!(s.message, "Hi there");
    }

    #[test]
    fn every_field_is_required() {
        for key in ["name", "email", "subject", "message"] {
            let mut missing = ada();
            missing.as_object_mut().unwrap().remove(key);
            assert!(matches!(ContactSubmission::parse(&missing, &owner()), Err(AppError::MissingFields)), "{key}");

            let mut empty = ada();
            empty[key] = json!("");
            assert!(matches!(ContactSubmission::parse(&empty, &owner()), Err(AppError::MissingFields)), "{key}");

            let mut blank = ada();
            blank[key] = json!("  \n ");
            assert!(matches!(ContactSubmission::parse(&blank, &owner()), Err(AppError::MissingFields)), "{key}");
        }
    }

    #[test]
    fn wrong_types_count_as_missing() {
        for value in [json!(null), json!(42), json!(true), json!(["Ada"]), json!({ "first": "Ada" })] {
            let mut body = ada();
            body["name"] = value;
            assert!(matches!(ContactSubmission::parse(&body, &owner()), Err(AppError::MissingFields)));
        }
        for body in [json!(null), json!("Ada"), json!([ada()])] {
            assert!(matches!(ContactSubmission::parse(&body, &owner()), Err(AppError::MissingFields)));
        }
    }

    #[test]
    fn rejects_owner_address() {
        for email in ["owner@site.test", "Owner@Site.Test", " owner@site.test "] {
            let mut body = ada();
            body["email"] = json!(email);
            assert!(matches!(ContactSubmission::parse(&body, &owner()), Err(AppError::OwnerAddress)), "{email}");
        }
    }

    #[test]
    fn rejects_every_owner_address() {
        let owners = vec!["owner@site.test".to_string(), "deepath@gmail.test".to_string()];
        for email in ["owner@site.test", "Deepath@Gmail.test"] {
            let mut body = ada();
            body["email"] = json!(email);
            assert!(matches!(ContactSubmission::parse(&body, &owners), Err(AppError::OwnerAddress)), "{email}");
        }
        assert!(ContactSubmission::parse(&ada(), &owners).is_ok());
    }

    #[test]
    fn presence_is_checked_before_owner() {
        let body = json!({ "name": "", "email": "owner@site.test", "subject": "x", "message": "y" });
        assert!(matches!(ContactSubmission::parse(&body, &owner()), Err(AppError::MissingFields)));
    }

    #[test]
    fn rejects_malformed_address() {
        let mut body = ada();
        body["email"] = json!("not an address");
        assert!(matches!(ContactSubmission::parse(&body, &owner()), Err(AppError::InvalidAddress)));
    }

    #[test]
    fn message_keeps_newlines() {
        let mut body = ada();
        body["message"] = json!("line one\nline two\n");
        let s = ContactSubmission::parse(&body, &owner()).unwrap();
        assert_eq!(s.message, "line one\nline two\n");
    }

    #[test]
    fn subject_line_is_single_line() {
        let mut body = ada();
        body["subject"] = json!("Hello\r\nBcc: victim@example.com");
        let s = ContactSubmission::parse(&body, &owner()).unwrap();
        assert_eq!(s.subject_line(), "New message from Ada: Hello  Bcc: victim@example.com");
    }

    #[test]
    fn fields_completeness() {
        let fields = ContactFields {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hello".into(),
            message: "Hi".into(),
        };
        assert!(fields.is_complete());
        assert!(!ContactFields { subject: " ".into(), ..fields }.is_complete());
        assert!(!ContactFields::default().is_complete());
    }
}
