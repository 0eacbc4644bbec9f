//! Response envelope shared by every endpoint
//!
//! Success:
//!
//! ```json
//! {"result": {"exists": true}, "status": "ok", "time": 0.000012}
//! ```
//!
//! Failure:
//!
//! ```json
//! {"status": {"error": "Collection not found: wrong"}, "time": 0.000008}
//! ```

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// 200 OK
pub const OK: u16 = 200;

/// `status` field of a response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Serialized as `"ok"`
    Ok,
    /// Serialized as `{"error": "<message>"}`
    Error(String),
}

/// JSON body of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody<T> {
    /// Endpoint result, absent on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Outcome
    pub status: ResponseStatus,
    /// Handling time in seconds
    pub time: f64,
}

/// Status code plus body, ready to be written by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status_code: u16,
    /// JSON body
    pub body: ResponseBody<T>,
}

impl<T> ApiResponse<T> {
    /// 200 response carrying `result`
    pub fn ok(result: T, timing: Instant) -> Self {
        Self {
            status_code: OK,
            body: ResponseBody {
                result: Some(result),
                status: ResponseStatus::Ok,
                time: timing.elapsed().as_secs_f64(),
            },
        }
    }

    /// Error response with the status of `err`
    pub fn error(err: ApiError, timing: Instant) -> Self {
        Self {
            status_code: err.status,
            body: ResponseBody {
                result: None,
                status: ResponseStatus::Error(err.message),
                time: timing.elapsed().as_secs_f64(),
            },
        }
    }

    /// Whether the request succeeded
    pub fn is_success(&self) -> bool {
        self.body.status == ResponseStatus::Ok
    }

    /// The result, if the request succeeded
    pub fn result(&self) -> Option<&T> {
        self.body.result.as_ref()
    }

    /// The error message, if the request failed
    pub fn error_message(&self) -> Option<&str> {
        match &self.body.status {
            ResponseStatus::Ok => None,
            ResponseStatus::Error(message) => Some(message),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Serialize the body
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}

/// Turn a handler outcome into a response, logging failures
pub fn process_response<T, E>(response: Result<T, E>, timing: Instant) -> ApiResponse<T>
where
    E: Into<ApiError>,
{
    match response {
        Ok(result) => ApiResponse::ok(result, timing),
        Err(err) => {
            let err = err.into();
            if err.is_server_error() {
                warn!(target: "vexdb::api", status = err.status, error = %err.message, "Request failed");
            } else {
                debug!(target: "vexdb::api", status = err.status, error = %err.message, "Request rejected");
            }
            ApiResponse::error(err, timing)
        }
    }
}
