/// Input validators for account data
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Phishing Protection: Email validation
/// 3. Injection Protection: SQL pattern and control character screening on
///    free-text fields (emails are covered by the format regex)
///
/// Every validator returns the normalised value (trimmed, and lowercased
/// where the column is case-insensitive) so handlers store exactly what
/// was checked.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_NAME_LENGTH: usize = 256;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 30;
const MAX_URL_LENGTH: usize = 2048;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-z0-9_.]+$").unwrap();

    static ref URL_REGEX: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();

    // Keywords are anchored and function-like keywords need a call
    // parenthesis, so ordinary names ("Castillo", "Sleeper") pass.
    static ref SQL_INJECTION_PATTERNS: [Regex; 6] = [
        // Union-based SQL injection
        Regex::new(r"(?i)\bUNION\s+(ALL\s+)?SELECT\b").unwrap(),
        // Comment-based injection
        Regex::new(r"(?i)(--|;|/\*|\*/|\b(xp|sp)_\w+)").unwrap(),
        // Stacked queries
        Regex::new(r"(?i);\s*(INSERT|UPDATE|DELETE|DROP|CREATE|ALTER)\b").unwrap(),
        // Time-based blind injection
        Regex::new(r"(?i)\b(SLEEP|WAITFOR|BENCHMARK|DBMS_LOCK)\b\s*\(").unwrap(),
        // Boolean-based injection
        Regex::new(r#"(?i)(\bOR\b|\bAND\b)\s*(['"][0-9]*['"]|[0-9]*)\s*=\s*(['"][0-9]*['"]|[0-9]*|True|False)"#).unwrap(),
        // Function-based injection
        Regex::new(r"(?i)\b(CAST|CONVERT|SUBSTRING|CONCAT|LOAD_FILE)\s*\(").unwrap(),
    ];
}

/// Returns the trimmed value, or `EmptyField` when nothing is left.
pub fn require_non_empty(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validates an email address and returns it lowercased.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = require_non_empty("email", email)?;

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(&trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    if has_suspicious_email_patterns(&trimmed) {
        return Err(ValidationError::SuspiciousContent("email".to_string()));
    }

    Ok(trimmed.to_lowercase())
}

/// Validates a username and returns it lowercased.
///
/// Allowed: 3 to 30 characters of `a-z`, `0-9`, `_` and `.`.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let lowered = require_non_empty("username", username)?.to_lowercase();

    if lowered.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username".to_string(), MIN_USERNAME_LENGTH));
    }

    if lowered.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(&lowered) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(lowered)
}

/// Validates a display name
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = require_non_empty("full_name", name)?;

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("full_name".to_string(), MAX_NAME_LENGTH));
    }

    if has_suspicious_name_patterns(&trimmed) {
        return Err(ValidationError::SuspiciousContent("full_name".to_string()));
    }

    if contains_sql_injection_patterns(&trimmed) {
        return Err(ValidationError::PossibleSQLInjection);
    }

    Ok(trimmed)
}

/// Validates an already-hosted image URL (avatar, cover image)
pub fn is_valid_image_url(field: &str, url: &str) -> Result<String, ValidationError> {
    let trimmed = require_non_empty(field, url)?;

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong(field.to_string(), MAX_URL_LENGTH));
    }

    if !URL_REGEX.is_match(&trimmed) {
        return Err(ValidationError::InvalidFormat(field.to_string()));
    }

    Ok(trimmed)
}

fn has_suspicious_email_patterns(email: &str) -> bool {
    // Extremely long local part
    if let Some(at_pos) = email.find('@') {
        if at_pos > 64 {
            return true;
        }
    }

    if email.matches('@').count() != 1 {
        return true;
    }

    email.contains('\0')
}

fn has_suspicious_name_patterns(name: &str) -> bool {
    if name.chars().any(|c| c.is_control()) {
        return true;
    }

    let special_char_count = name
        .chars()
        .filter(|c| {
            !c.is_alphanumeric() && !c.is_whitespace() && !matches!(c, '-' | '.' | '_' | '\'')
        })
        .count();

    special_char_count > 5
}

fn contains_sql_injection_patterns(input: &str) -> bool {
    SQL_INJECTION_PATTERNS.iter().any(|pattern| pattern.is_match(input))
}
