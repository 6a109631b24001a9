use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::store::StoreError;

pub const NAME_REQUIRED: &str = "Name cannot be blank";
pub const USER_NOT_FOUND: &str = "User not found";

/// Request body could not be turned into a typed payload.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Field name -> message, one entry per offending field.
    #[error("invalid fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Fields(BTreeMap<String, String>),

    #[error("Failed to decode JSON object: {0}")]
    MalformedJson(String),

    #[error("Failed to read request body: {0}")]
    UnreadableBody(String),
}

impl ValidationError {
    pub fn field(name: &str, message: &str) -> Self {
        ValidationError::Fields(BTreeMap::from([(name.to_string(), message.to_string())]))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", USER_NOT_FOUND)]
    NotFound,

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Write path failure; the raw store message goes back to the caller.
    #[error("{0}")]
    Persistence(StoreError),

    /// Read path failure; logged, never exposed.
    #[error("store unavailable: {0}")]
    Internal(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(ValidationError::Fields(fields)) => json!({ "message": fields }),
            AppError::Validation(err) => json!({ "message": err.to_string() }),
            AppError::NotFound => json!({ "error": USER_NOT_FOUND }),
            AppError::PayloadTooLarge(_) => json!({ "message": self.to_string() }),
            AppError::Persistence(err) => json!({ "error": err.to_string() }),
            AppError::Internal(err) => {
                log::error!("❌ Store failure on read path: {}", err);
                json!({ "message": "Internal Server Error" })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
