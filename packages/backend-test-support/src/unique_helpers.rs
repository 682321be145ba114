//! ULID-backed unique values so tests never collide on unique columns.

use ulid::Ulid;

/// `{prefix}-{ulid}`
///
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("user");
/// assert_ne!(a, unique_str("user"));
/// assert!(a.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// `{prefix}-{ulid}@example.test`
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, Ulid::new())
}

/// A value accepted by the `X-Device-Token` header rules.
///
/// ```
/// use backend_test_support::unique_helpers::unique_device_token;
///
/// let token = unique_device_token();
/// assert!(token.len() >= 16 && token.len() <= 64);
/// ```
pub fn unique_device_token() -> String {
    format!("dev_{}", Ulid::new().to_string().to_ascii_lowercase())
}
