// Academic service client error types
use thiserror::Error;

/// Failure of a call against the academic records service.
///
/// The client only ever reports the kind plus whatever detail the server or
/// transport produced; turning it into text for a person is left to
/// [`ApiError::user_message`] and the views.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    #[error("bad request: {0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    // 403 Forbidden
    #[error("forbidden: {0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("not found: {0}")]
    NotFound(String),

    // 409 Conflict
    #[error("conflict: {0}")]
    Conflict(String),

    // 422 Unprocessable Entity
    #[error("validation error: {0}")]
    ValidationError(String),

    // 500 Internal Server Error
    #[error("server error: {0}")]
    ServerError(String),

    #[error("unexpected status {status}: {message}")]
    UnknownStatus { status: u16, message: String },

    /// Request was sent but no response came back
    #[error("service unreachable: {0}")]
    NetworkUnreachable(String),

    /// Request could not be built or sent at all
    #[error("request configuration error: {0}")]
    ConfigurationError(String),

    /// Rejected before any request was issued
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 2xx response whose body could not be normalized
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Map a non-2xx status and its body detail to the taxonomy
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::ValidationError(message),
            500 => ApiError::ServerError(message),
            status => ApiError::UnknownStatus { status, message },
        }
    }

    /// Classify a transport failure from reqwest
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::ConfigurationError(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), err.to_string())
        } else {
            ApiError::NetworkUnreachable(err.to_string())
        }
    }

    /// HTTP status behind this error, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::ValidationError(_) => Some(422),
            ApiError::ServerError(_) => Some(500),
            ApiError::UnknownStatus { status, .. } => Some(*status),
            ApiError::NetworkUnreachable(_)
            | ApiError::ConfigurationError(_)
            | ApiError::InvalidArgument(_)
            | ApiError::InvalidResponse(_) => None,
        }
    }

    /// Stable code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::ServerError(_) => "SERVER_ERROR",
            ApiError::UnknownStatus { .. } => "UNKNOWN_STATUS",
            ApiError::NetworkUnreachable(_) => "NETWORK_UNREACHABLE",
            ApiError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            ApiError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ApiError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Message suitable for showing to the person at the terminal
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest(_) => "Invalid data sent to the server".to_string(),
            ApiError::Unauthorized(_) => "Not authorized. Check your API key".to_string(),
            ApiError::Forbidden(_) => "Access forbidden. You do not have permission for this action".to_string(),
            ApiError::NotFound(_) => "Resource not found".to_string(),
            ApiError::Conflict(_) => "Conflict. The resource already exists".to_string(),
            ApiError::ValidationError(_) => "Validation failed for the submitted data".to_string(),
            ApiError::ServerError(_) => "Internal server error".to_string(),
            ApiError::UnknownStatus { status, .. } => format!("Server error: {}", status),
            ApiError::NetworkUnreachable(_) => {
                "Could not connect to the server. Check your network connection".to_string()
            }
            ApiError::ConfigurationError(_) => "Error while setting up the request".to_string(),
            ApiError::InvalidArgument(msg) => msg.clone(),
            ApiError::InvalidResponse(_) => "The server returned data in an unexpected format".to_string(),
        }
    }
}

/// Pull a readable detail out of an error body.
///
/// Services answer with `{"detail": ...}`, `{"message": ...}` or
/// `{"error": ...}`; anything else is passed through trimmed.
pub fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(text)) => return text.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        trimmed.chars().take(200).collect::<String>() + "…"
    } else {
        trimmed.to_string()
    }
}
