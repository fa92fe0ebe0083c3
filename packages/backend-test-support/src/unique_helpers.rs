//! Unique test data
//!
//! ULID-suffixed values so tests sharing a database never collide.

use ulid::Ulid;

/// Generate a unique email address in the format `{prefix}-{ulid}@example.test`
///
/// ```
/// use backend_test_support::unique_helpers::unique_email;
///
/// let a = unique_email("signup");
/// let b = unique_email("signup");
/// assert_ne!(a, b);
/// assert!(a.starts_with("signup-"));
/// assert!(a.ends_with("@example.test"));
/// ```
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, Ulid::new()).to_lowercase()
}
