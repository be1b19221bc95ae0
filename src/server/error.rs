use super::handlers::MessageBody;
use crate::core::error::DispatchError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// Kept verbatim for existing clients.
pub const MISSING_FIELDS_MESSAGE: &str = "user_query or model_type is missing";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body was missing fields or was not valid JSON
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Dispatch(DispatchError::UnknownModelType(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        warn!(status = status.as_u16(), %message, "Request failed");
        (status, Json(MessageBody { message })).into_response()
    }
}
