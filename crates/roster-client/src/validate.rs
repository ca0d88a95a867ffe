use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use roster_types::models::Role;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only: non-empty local part, one @, dotted domain.
        // Full RFC 5322 enforcement stays with the backend.
        let pattern = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Whether `email` looks like a deliverable address.
pub fn email_shape_ok(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Parse a raw role string against the closed [`Role`] set.
pub fn parse_role(role: &str) -> Option<Role> {
    Role::from_str(role).ok()
}

/// Email equality as the uniqueness check sees it: case-insensitive.
pub fn emails_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
