//! Request form validation.
//!
//! Each form collects one message per failing field; the route layer renders
//! them into the envelope's `result` object.

use std::collections::BTreeMap;

use lazy_regex::regex_is_match;
use serde::Deserialize;

use crate::error::AppError;
use crate::repos::users::NewUser;

pub const MIN_PASSWORD_LEN: usize = 8;

pub type FieldErrors = BTreeMap<String, String>;

/// Loose address check: one `@`, no whitespace, a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", email)
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl SignupForm {
    /// Check every field and return the trimmed signup input.
    pub fn validate(&self) -> Result<NewUser, AppError> {
        let mut errors = FieldErrors::new();
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email_address = self.email_address.trim();

        if first_name.is_empty() {
            errors.insert("first_name".into(), "First name is required".into());
        }
        if last_name.is_empty() {
            errors.insert("last_name".into(), "Last name is required".into());
        }
        if email_address.is_empty() {
            errors.insert("email_address".into(), "Email is required".into());
        } else if !is_valid_email(email_address) {
            errors.insert("email_address".into(), "Email is invalid".into());
        }
        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password".into(),
                format!("Password must be {MIN_PASSWORD_LEN} characters or more"),
            );
        }
        if self.confirm_password.is_empty() {
            errors.insert(
                "confirm_password".into(),
                "Password should be confirmed".into(),
            );
        } else if self.confirm_password != self.password {
            errors.insert("confirm_password".into(), "Passwords don't match".into());
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        Ok(NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email_address: email_address.to_string(),
            password: Some(self.password.clone()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub password: String,
}

impl SigninForm {
    /// Returns the trimmed email address on success.
    pub fn validate(&self) -> Result<String, AppError> {
        let mut errors = FieldErrors::new();
        let email_address = self.email_address.trim();

        if email_address.is_empty() {
            errors.insert("email_address".into(), "Email is required".into());
        }
        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        }

        if errors.is_empty() {
            Ok(email_address.to_string())
        } else {
            Err(AppError::InvalidFields(errors))
        }
    }
}
