/// Shared input validation for route handlers.
use crate::constants::MAX_SESSION_ID_LEN;

/// 1-128 chars of ASCII letters, digits, `-` and `_`. Used for session and request ids.
pub fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn validate_session_id(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("sessionId must not be empty");
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return Err("sessionId must be at most 128 characters");
    }
    if !is_safe_identifier(id) {
        return Err("sessionId may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}
