//! API errors and their HTTP status codes
//!
//! | Status | Variants |
//! |--------|----------|
//! | 400 | `InvalidName`, `InvalidConfig`, malformed body |
//! | 404 | `NotFound` |
//! | 409 | `AlreadyExists` |
//! | 503 | `Busy`, `Closed` |
//! | 500 | everything else |

use vexdb_core::RegistryError;

/// 400 Bad Request
pub const BAD_REQUEST: u16 = 400;
/// 404 Not Found
pub const NOT_FOUND: u16 = 404;
/// 409 Conflict
pub const CONFLICT: u16 = 409;
/// 500 Internal Server Error
pub const INTERNAL_SERVER_ERROR: u16 = 500;
/// 503 Service Unavailable
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// Error reported to API clients
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Human readable description, sent as `status.error`
    pub message: String,
}

impl ApiError {
    /// Error with an explicit status
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 for a request body that does not parse
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(BAD_REQUEST, message)
    }

    /// Whether the fault lies with the server rather than the request
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// HTTP status for a registry error
pub fn status_for(err: &RegistryError) -> u16 {
    match err {
        RegistryError::InvalidName { .. } | RegistryError::InvalidConfig { .. } => BAD_REQUEST,
        RegistryError::NotFound { .. } => NOT_FOUND,
        RegistryError::AlreadyExists { .. } => CONFLICT,
        RegistryError::Busy { .. } | RegistryError::Closed => SERVICE_UNAVAILABLE,
        RegistryError::AllocationFailed { .. }
        | RegistryError::DeallocationFailed { .. }
        | RegistryError::InvalidTransition { .. }
        | RegistryError::Recovery(_)
        | RegistryError::Config(_)
        | RegistryError::Io(_) => INTERNAL_SERVER_ERROR,
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::new(status_for(&err), err.to_string())
    }
}
