//! Input validation for administrative user management

use regex::Regex;
use std::sync::OnceLock;

/// Validate a new user id
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("User ID is required".to_string());
    }

    if username.len() < 3 {
        return Err("User ID must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("User ID must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("User ID can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate a new password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err("Password must contain at least one letter and one digit".to_string());
    }

    Ok(())
}
