//! Input validation for account fields

use crate::error::AuthError;

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 256;
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Trim, lowercase and check an email address
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(AuthError::InvalidInput("email is required".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "email must be at most {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if email.contains(char::is_whitespace) {
        return Err(AuthError::InvalidInput(
            "email must not contain whitespace".to_string(),
        ));
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::InvalidInput(
            "email must contain exactly one '@'".to_string(),
        ));
    };

    if local.is_empty() {
        return Err(AuthError::InvalidInput("email local part is empty".to_string()));
    }
    let labels_ok = domain.split('.').all(|label| !label.is_empty());
    if !domain.contains('.') || !labels_ok {
        return Err(AuthError::InvalidInput(
            "email domain is not valid".to_string(),
        ));
    }

    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH || password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "password must be {} to {} bytes",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "username must be 1 to {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AuthError::InvalidInput(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
    }

    #[test]
    fn test_invalid_emails() {
        let long = format!("{}@example.com", "a".repeat(250));
        for email in [
            "",
            "   ",
            "no-at-sign",
            "two@@example.com",
            "a@b@example.com",
            "@example.com",
            "user@localhost",
            "user@.com",
            "user@example.",
            "us er@example.com",
            long.as_str(),
        ] {
            assert!(
                matches!(normalize_email(email), Err(AuthError::InvalidInput(_))),
                "accepted {:?}",
                email
            );
        }
    }

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH)).is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("quiz_master-1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("émile").is_err());
        assert!(validate_username(&"u".repeat(MAX_USERNAME_LENGTH)).is_ok());
        assert!(validate_username(&"u".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }
}
