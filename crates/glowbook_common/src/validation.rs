//! Contact validation shared by the booking flow and every subscribe form.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::ContactDetails;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    #[error("Please enter your name.")]
    MissingName,
    #[error("Please enter your email address.")]
    MissingEmail,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a valid phone number.")]
    InvalidPhone,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Strips separators from a phone number, keeping a leading `+`.
///
/// Returns `None` when the digit count is outside 7..=15 or when anything
/// other than digits, spaces, dots, dashes and parentheses is present.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }
    Some(if plus { format!("+{}", digits) } else { digits })
}

/// Validates contact details and returns a trimmed, normalized copy.
pub fn validate_contact(contact: &ContactDetails) -> Result<ContactDetails, ContactValidationError> {
    let name = contact.name.trim();
    if name.is_empty() {
        return Err(ContactValidationError::MissingName);
    }
    let email = contact.email.trim();
    if email.is_empty() {
        return Err(ContactValidationError::MissingEmail);
    }
    if !is_valid_email(email) {
        return Err(ContactValidationError::InvalidEmail);
    }
    let phone = match contact.phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(normalize_phone(raw).ok_or(ContactValidationError::InvalidPhone)?),
    };
    let notes = contact
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ContactDetails {
        name: name.to_string(),
        email: email.to_lowercase(),
        phone,
        notes,
    })
}
