//! PII masking for log fields.
//!
//! Emails keep their first character and domain, phone numbers keep their
//! last two digits, and long opaque tokens (JWTs, device tokens, hex ids) are
//! replaced entirely.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

#[allow(clippy::unwrap_used)]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap());

// Phone-like runs: optional +, then 7+ digits possibly separated by space ( ) -
#[allow(clippy::unwrap_used)]
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d ()-]{5,}\d").unwrap());

#[allow(clippy::unwrap_used)]
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9+/_.-]{16,}={0,2}").unwrap());

const TOKEN_MASK: &str = "[REDACTED_TOKEN]";

fn mask_email(caps: &Captures) -> String {
    let full = &caps[0];
    match full.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            format!("{}***@{domain}", &local[..1])
        }
        _ => full.to_string(),
    }
}

fn mask_phone(caps: &Captures) -> String {
    let digits: Vec<char> = caps[0].chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 7 {
        return caps[0].to_string();
    }
    let tail: String = digits[digits.len() - 2..].iter().collect();
    format!("***{tail}")
}

/// Mask emails, then tokens, then phone numbers.
pub fn redact(input: &str) -> String {
    let emailed = EMAIL.replace_all(input, mask_email);
    let tokened = TOKEN.replace_all(&emailed, |caps: &Captures| {
        let m = &caps[0];
        // Domains of already-masked emails and digit runs are left for later steps.
        let after_at = caps
            .get(0)
            .is_some_and(|g| emailed[..g.start()].ends_with('@'));
        if after_at || m.chars().all(|c| c.is_ascii_digit() || c == '-') {
            m.to_string()
        } else {
            TOKEN_MASK.to_string()
        }
    });
    PHONE.replace_all(&tokened, mask_phone).into_owned()
}

/// Display wrapper that redacts on format.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
