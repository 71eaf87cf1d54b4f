//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::assistant::AssistantError;
use crate::booking::ClaimError;

pub const LOADING_MESSAGE: &str = "جاري تحميل جدول الدورية...";
pub const BUSY_MESSAGE: &str = "جاري الإبداع...";

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        // Respond with an error status
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

/// Failures the user can act on, each with a short localized message.
#[derive(Debug)]
pub enum ServiceError {
    /// No session or snapshot yet
    Loading,
    /// The subscription failed before anything could be shown
    Unavailable(String),
    NotBooked(String),
    Busy,
    Claim(ClaimError),
    Assistant(AssistantError),
}

impl From<ClaimError> for ServiceError {
    fn from(err: ClaimError) -> Self {
        Self::Claim(err)
    }
}

impl From<AssistantError> for ServiceError {
    fn from(err: AssistantError) -> Self {
        Self::Assistant(err)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Loading | ServiceError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServiceError::NotBooked(_) => StatusCode::NOT_FOUND,
            ServiceError::Busy => StatusCode::CONFLICT,
            ServiceError::Claim(ClaimError::EmptyHost) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Claim(ClaimError::UnknownMonth(_)) => StatusCode::NOT_FOUND,
            ServiceError::Claim(ClaimError::AlreadyBooked { .. }) => StatusCode::CONFLICT,
            ServiceError::Claim(ClaimError::WriteFailed(_)) => StatusCode::BAD_GATEWAY,
            ServiceError::Assistant(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Loading => LOADING_MESSAGE.to_string(),
            ServiceError::Unavailable(message) => message.clone(),
            ServiceError::NotBooked(_) => "لم يُحجز بعد".to_string(),
            ServiceError::Busy => BUSY_MESSAGE.to_string(),
            ServiceError::Claim(err) => err.user_message().to_string(),
            ServiceError::Assistant(err) => err.user_message().to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::Claim(ClaimError::WriteFailed(e)) => {
                tracing::error!("Booking write failed: {}", e)
            }
            ServiceError::Assistant(e) => tracing::error!("Assistant request failed: {}", e),
            other => tracing::debug!("Request refused: {:?}", other),
        }
        let body = ErrorResponse {
            error: self.user_message(),
            status: matches!(self, ServiceError::Loading).then_some("loading"),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// Re-export public types from each route

pub mod assistant {
    pub use crate::api::routes::assistant::public::*;
}

pub mod bookings {
    pub use crate::api::routes::bookings::public::*;
}

pub mod catalog {
    pub use crate::api::routes::catalog::public::*;
}
