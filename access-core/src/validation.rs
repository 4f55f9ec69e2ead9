use crate::error::Error;

/// Longest value accepted for `role_name` and `admin_code`, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// A required, length-limited identifier such as a role name or admin code.
///
/// Length is counted in characters, matching SQLite's `length()` on text.
pub fn require_name(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    let len = value.chars().count();
    if len > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters, got {}",
            field, MAX_NAME_LEN, len
        )));
    }
    Ok(())
}

pub fn require_id(field: &str, value: i32) -> Result<(), Error> {
    if value <= 0 {
        return Err(Error::Validation(format!("{} must be a positive integer, got {}", field, value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name() {
        assert!(require_name("role_name", "Administrator").is_ok());
        assert!(require_name("role_name", &"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(matches!(require_name("role_name", ""), Err(Error::Validation(_))));
        assert!(matches!(require_name("role_name", "   "), Err(Error::Validation(_))));
        assert!(matches!(
            require_name("role_name", &"x".repeat(MAX_NAME_LEN + 1)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_require_name_counts_characters() {
        // 50 two-byte characters is 100 bytes but still within the limit
        assert!(require_name("admin_code", &"é".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_require_id() {
        assert!(require_id("user_id", 7).is_ok());
        assert!(require_id("user_id", 0).is_err());
        assert!(require_id("user_id", -3).is_err());
    }
}
