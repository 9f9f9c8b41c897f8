use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Token exchange against the identity provider failed.
    Auth {
        /// Upstream HTTP status, when the provider answered at all.
        status: Option<u16>,
        /// Human-readable failure description.
        message: String,
    },
    /// Score endpoint call failed or returned unparseable data.
    Fetch {
        /// Upstream HTTP status, when the endpoint answered at all.
        status: Option<u16>,
        /// Human-readable failure description.
        message: String,
    },
    /// Internal server error.
    Internal(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    pub fn auth(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Auth {
            status,
            message: message.into(),
        }
    }

    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Fetch {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth { status, message } => match status {
                Some(code) => write!(f, "Authentication failed ({}): {}", code, message),
                None => write!(f, "Authentication failed: {}", message),
            },
            AppError::Fetch { status, message } => match status {
                Some(code) => write!(f, "Score fetch failed ({}): {}", code, message),
                None => write!(f, "Score fetch failed: {}", message),
            },
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Both upstream stages map to 502 Bad Gateway with a JSON body carrying
    /// the message and the upstream status when one was observed. Errors are
    /// logged here so handlers can propagate with `?` alone.
    fn into_response(self) -> Response {
        let (status, upstream_status, error_message) = match &self {
            AppError::Auth { status, message } => {
                tracing::error!("Auth error (upstream {:?}): {}", status, message);
                (
                    StatusCode::BAD_GATEWAY,
                    *status,
                    format!("Authentication failed: {}", message),
                )
            }
            AppError::Fetch { status, message } => {
                tracing::error!("Fetch error (upstream {:?}): {}", status, message);
                (
                    StatusCode::BAD_GATEWAY,
                    *status,
                    format!("Score fetch failed: {}", message),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                // Delegate to underlying error's response
                return source.clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
            "upstream_status": upstream_status,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    ///
    /// Transport-level failures without a stage of their own are treated as
    /// fetch errors; the upstream clients attach stage-specific variants at
    /// the call sites instead of relying on this.
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    #[allow(dead_code)]
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
