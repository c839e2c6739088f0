//! Centralized validation of user-supplied values.
//!
//! This module provides unified validation for:
//! - Shield map names (DNS-style)
//! - Rule-tree behavior names
//!
//! Everything here runs before any network call.

use crate::error::AuditError;

/// Maximum length of a DNS name
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single DNS label
const MAX_LABEL_LEN: usize = 63;

/// Shield map name validation (e.g., "s123.akamaiedge.net").
///
/// Requires ASCII-only input, dot-separated labels of letters, digits and
/// hyphens, no label starting or ending with a hyphen.
///
/// # Examples
/// ```
/// use shieldaudit::validation::is_valid_map_name;
/// assert!(is_valid_map_name("s123.akamaiedge.net"));
/// assert!(!is_valid_map_name("bad name"));
/// assert!(!is_valid_map_name(""));
/// ```
pub fn is_valid_map_name(name: &str) -> bool {
    if !name.is_ascii() || name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Validate a shield map name given on the command line.
pub fn validate_map_name(name: &str) -> Result<(), AuditError> {
    if is_valid_map_name(name) {
        Ok(())
    } else {
        Err(AuditError::Usage(format!(
            "Invalid shield map name: '{}'. Expected a DNS name like 's123.akamaiedge.net'",
            name
        )))
    }
}

/// Behavior names are plain identifiers (letters, digits, underscore).
///
/// # Examples
/// ```
/// use shieldaudit::validation::is_valid_behavior_name;
/// assert!(is_valid_behavior_name("cpCode"));
/// assert!(!is_valid_behavior_name("cp'Code"));
/// ```
pub fn is_valid_behavior_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a behavior name given on the command line.
pub fn validate_behavior_name(name: &str) -> Result<(), AuditError> {
    if is_valid_behavior_name(name) {
        Ok(())
    } else {
        Err(AuditError::Usage(format!(
            "Invalid behavior name: '{}'. Use a behavior name like 'cpCode'",
            name
        )))
    }
}

/// Worker counts must allow at least one lookup in flight.
pub fn validate_workers(workers: usize) -> Result<(), AuditError> {
    if workers == 0 {
        return Err(AuditError::Usage(
            "--workers must be at least 1".to_string(),
        ));
    }
    Ok(())
}
