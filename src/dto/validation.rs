//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum length of a participant nickname.
const NICKNAME_MAX_LENGTH: usize = 24;

/// Validates that a nickname is non-blank and at most 24 characters.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.trim().is_empty() {
        let mut err = ValidationError::new("nickname_blank");
        err.message = Some("Nickname must not be blank".into());
        return Err(err);
    }

    if nickname.chars().count() > NICKNAME_MAX_LENGTH {
        let mut err = ValidationError::new("nickname_length");
        err.message = Some(
            format!("Nickname must be at most {NICKNAME_MAX_LENGTH} characters").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_nicknames() {
        assert!(validate_nickname("alice").is_ok());
        assert!(validate_nickname("Zażółć gęślą").is_ok());
        assert!(validate_nickname("x").is_ok());
    }

    #[test]
    fn rejects_blank_nicknames() {
        assert!(validate_nickname("").is_err());
        assert!(validate_nickname("   ").is_err());
    }

    #[test]
    fn rejects_overlong_nicknames() {
        assert!(validate_nickname(&"a".repeat(25)).is_err());
    }
}
