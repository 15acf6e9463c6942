//! Utility functions

use uuid::Uuid;

pub fn is_valid_uuid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}

/// Normalize a user-supplied department code: trimmed, uppercased,
/// inner whitespace collapsed to a single dash.
pub fn normalize_code(code: &str) -> String {
    code.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_uppercase()
}
