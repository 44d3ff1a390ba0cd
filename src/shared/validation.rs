//! Input validation shared by the auth, feed and ledger handlers.

use crate::shared::SharedError;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum caption length for a post
pub const MAX_CAPTION_LEN: usize = 2000;

/// Maximum comment length
pub const MAX_COMMENT_LEN: usize = 500;

/// Maximum chat message length over the WebSocket
pub const MAX_CHAT_LEN: usize = 1000;

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Basic email shape check: `local@domain` with both parts non-empty.
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Validate a free-text field's length in characters.
pub fn check_text(field: &str, value: &str, min: usize, max: usize) -> Result<(), SharedError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(SharedError::validation(field, format!("must be at least {} characters", min)));
    }
    if value.chars().count() > max {
        return Err(SharedError::validation(field, format!("must be at most {} characters", max)));
    }
    Ok(())
}

/// Validate a monetary amount in cents.
pub fn check_amount(field: &str, amount_cents: i64) -> Result<(), SharedError> {
    if amount_cents <= 0 {
        return Err(SharedError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a_b_1"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("1alice"));
        assert!(!is_valid_username("alice!"));
        assert!(!is_valid_username(&"a".repeat(31)));
    }

    #[test]
    fn test_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn test_check_text_bounds() {
        assert!(check_text("text", "hi", 1, 5).is_ok());
        assert!(check_text("text", "   ", 1, 5).is_err());
        assert!(check_text("text", "toolong", 1, 5).is_err());
        assert!(check_text("caption", "", 0, 5).is_ok());
    }

    #[test]
    fn test_check_amount() {
        assert!(check_amount("amount_cents", 1).is_ok());
        assert_eq!(
            check_amount("amount_cents", 0),
            Err(SharedError::validation("amount_cents", "must be greater than zero"))
        );
        assert!(check_amount("amount_cents", -5).is_err());
    }
}
