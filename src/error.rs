use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend rejected request ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Business {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A local failure producing a response, e.g. serializing an export.
    #[error("internal error: {0}")]
    Internal(String),

    /// A failed user action whose visible message is already resolved.
    #[error("{message}")]
    Action {
        message: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// The message the backend attached to a rejected request, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Business { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            AppError::Action { source, .. } => source.server_message(),
            _ => None,
        }
    }

    /// Text shown to the user: the server's message first, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::Action { message, .. } => message.clone(),
            AppError::Unauthorized => "Please log in to continue.".to_string(),
            AppError::NotFound => "The requested item was not found.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Resolve the visible message for a specific user action now, keeping the cause.
    pub fn for_action(self, fallback: &str) -> Self {
        let message = self.user_message(fallback);
        AppError::Action {
            message,
            source: Box::new(self),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Business { status, .. } => {
                if status.is_client_error() {
                    *status
                } else if status.is_success() {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Decode(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Action { source, .. } => source.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = json!({
            "success": false,
            "message": self.user_message(GENERIC_FAILURE),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_fallback() {
        let err = AppError::Business {
            status: StatusCode::BAD_REQUEST,
            message: Some("Event is full".to_string()),
        };
        assert_eq!(err.user_message("Failed to register"), "Event is full");
    }

    #[test]
    fn blank_server_message_uses_fallback() {
        let err = AppError::Business {
            status: StatusCode::BAD_REQUEST,
            message: Some("   ".to_string()),
        };
        assert_eq!(err.user_message("Failed to register"), "Failed to register");
    }

    #[test]
    fn decode_failures_use_fallback() {
        let err = AppError::Decode("eof".to_string());
        assert_eq!(err.user_message("Could not load events"), "Could not load events");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_failures_are_server_errors() {
        let err = AppError::Internal("csv flush failed".to_string()).for_action("Failed to export messages");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(GENERIC_FAILURE), "Failed to export messages");
    }

    #[test]
    fn action_keeps_cause_status() {
        let err = AppError::Business {
            status: StatusCode::CONFLICT,
            message: None,
        }
        .for_action("Failed to unregister from event");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(GENERIC_FAILURE), "Failed to unregister from event");
    }

    #[test]
    fn business_status_mapping() {
        let rejected = AppError::Business {
            status: StatusCode::OK,
            message: None,
        };
        assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let crashed = AppError::Business {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(crashed.status(), StatusCode::BAD_GATEWAY);
    }
}
