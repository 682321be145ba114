use std::sync::LazyLock;

use regex::Regex;

use crate::errors::domain::{DomainError, ValidationKind};

pub const DISPLAY_NAME_MIN_CHARS: usize = 2;
pub const DISPLAY_NAME_MAX_CHARS: usize = 50;

#[allow(clippy::unwrap_used)]
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9 ()-]{6,20}$").unwrap());

pub fn validate_display_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(DISPLAY_NAME_MIN_CHARS..=DISPLAY_NAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(
            ValidationKind::DisplayName,
            format!(
                "Display name must be {DISPLAY_NAME_MIN_CHARS}-{DISPLAY_NAME_MAX_CHARS} characters"
            ),
        ));
    }
    Ok(name.to_string())
}

pub fn validate_phone(raw: &str) -> Result<String, DomainError> {
    let phone = raw.trim();
    if PHONE.is_match(phone) {
        Ok(phone.to_string())
    } else {
        Err(DomainError::validation(
            ValidationKind::Phone,
            "Phone may contain digits, spaces, parentheses and dashes (6-20), optionally after '+'",
        ))
    }
}

pub fn validate_score(score: i64) -> Result<i16, DomainError> {
    if (1..=5).contains(&score) {
        Ok(score as i16)
    } else {
        Err(DomainError::validation(
            ValidationKind::Rating,
            format!("Rating must be between 1 and 5, got {score}"),
        ))
    }
}

/// Display name for a first login: the provided name, else the email local part.
pub fn derive_display_name(name: Option<&str>, email: &str) -> String {
    let candidate = name
        .map(str::trim)
        .filter(|n| n.chars().count() >= DISPLAY_NAME_MIN_CHARS)
        .or_else(|| email.split('@').next().filter(|l| !l.is_empty()))
        .unwrap_or("seller");

    let mut out: String = candidate.chars().take(DISPLAY_NAME_MAX_CHARS).collect();
    while out.chars().count() < DISPLAY_NAME_MIN_CHARS {
        out.push('_');
    }
    out
}
