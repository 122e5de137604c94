/// Session used when the caller does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Maximum accepted session id length.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "pose-detection";

/// Request body cap; base64 camera frames are large.
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;
