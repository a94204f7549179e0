//! Auth models

use serde::{Deserialize, Serialize};

/// Registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Login email
    pub email: String,

    /// Plain-text password, hashed before it is stored
    pub password: String,

    /// Name shown in the storefront; defaults to the email's local part
    pub display_name: Option<String>,
}

/// Lowercase and trim an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ana@example.mx"));
        assert!(is_valid_email("ana.lopez@mail.example.com"));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana lopez@example.com"));
        assert!(!is_valid_email("ana@@example.com"));
    }

    #[test]
    fn emails_are_normalised() {
        assert_eq!(normalize_email("  Ana@Example.MX "), "ana@example.mx");
    }
}
