//! Field rules for a vendor draft.
//!
//! Checks run in a fixed order and stop at the first failure:
//! required fields (trimmed), then email shape, then phone shape.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::draft::VendorDraft;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid phone regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("email must look like name@example.com")]
    InvalidEmail,

    #[error("phone number must be 10 digits starting with 6-9")]
    InvalidPhone,
}

impl ValidationError {
    /// Name of the offending draft field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field } => *field,
            ValidationError::InvalidEmail => "email",
            ValidationError::InvalidPhone => "phone",
        }
    }
}

/// Validates a draft without touching it.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_draft(draft: &VendorDraft) -> Result<(), ValidationError> {
    let required: [(&'static str, &str); 5] = [
        ("name", draft.name.as_str()),
        ("email", draft.email.as_str()),
        ("phone", draft.phone.as_str()),
        ("address", draft.address.as_str()),
        ("tenant_id", draft.tenant_id.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::Required { field });
        }
    }

    if !is_valid_email(&draft.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_valid_phone(&draft.phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}
