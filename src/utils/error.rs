use serde_json::json;

use crate::contact::relay::RelayError;
use crate::prelude::*;

/// Semantic app error. Every variant renders as `{"message": ...}` JSON with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("All fields are required")]
    MissingFields,
    #[error("You can't use my email id")]
    OwnerAddress,
    #[error("Invalid email address")]
    InvalidAddress,
    #[error("Message too large")]
    TooLarge,
    #[error("Not found")]
    NotFound,
    #[error("Error sending email")]
    Relay(#[from] RelayError),
}
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields | AppError::OwnerAddress | AppError::InvalidAddress => {
                StatusCode::BAD_REQUEST
            }
            AppError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Relay(e) => {
                // Transport errors can echo server banners and credentials; only the stage leaves the process.
                tracing::error!(stage = ?e.stage, owner_notified = e.owner_notified(), "{e:#}");
                json!({ "message": self.to_string(), "error": e.stage.describe() })
            }
            _ => {
                tracing::debug!(%status, "{self}");
                json!({ "message": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
