//! Error types shared by the services and their mapping onto HTTP responses.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid category")]
    InvalidCategory,
    #[error("Missing required fields")]
    MissingFields,
    #[error("Sum must be greater than zero")]
    InvalidSum,
    #[error("Missing required parameters. Please provide id, year, and month.")]
    MissingParams,
    #[error("Invalid year or month format")]
    InvalidPeriod,
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("User ID already exists")]
    Conflict,
    #[error("User not found")]
    NotFound,
    #[error("Not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey => ApiError::Conflict,
            other => ApiError::Storage(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(err) = self {
            error!(error = %err, "storage failure");
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn connection_reset() -> StoreError {
        StoreError::Mongo(std::io::Error::other("connection reset").into())
    }

    #[rstest]
    #[case(ApiError::from(ValidationError::InvalidSum), StatusCode::BAD_REQUEST)]
    #[case(ApiError::Conflict, StatusCode::BAD_REQUEST)]
    #[case(ApiError::NotFound, StatusCode::NOT_FOUND)]
    #[case(ApiError::RouteNotFound, StatusCode::NOT_FOUND)]
    #[case(ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED)]
    #[case(ApiError::Storage(connection_reset()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn errors_map_to_status_codes(#[case] err: ApiError, #[case] status: StatusCode) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_response().status(), status);
    }

    #[test]
    fn duplicate_key_becomes_conflict() {
        assert!(matches!(
            ApiError::from(StoreError::DuplicateKey),
            ApiError::Conflict
        ));
    }

    #[test]
    fn storage_message_is_passed_through() {
        let err = ApiError::from(connection_reset());
        assert!(err.to_string().contains("connection reset"));
    }
}
