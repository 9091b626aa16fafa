//! Error types for the HTTP layer.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::schema::{ValidationError, Violation, ViolationKind};
use crate::store::StoreError;

/// Result type for request handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing or out-of-range input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reference field is not a well-formed store identifier
    #[error("Invalid {field}")]
    InvalidReference {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The document store rejected or could not serve the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidReference { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(StoreError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(ValidationError::single(
            "query",
            Violation::new(
                "query",
                ViolationKind::Malformed {
                    reason: rejection.body_text(),
                },
            ),
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(e) => {
                info!(entity = e.entity, violations = e.violations.len(), "validation failed");
                json!({ "detail": self.to_string(), "errors": e.violations })
            }
            ApiError::InvalidReference { field, value } => {
                info!(field = *field, value = %value, "invalid reference");
                json!({ "detail": self.to_string() })
            }
            ApiError::Store(e) => {
                error!(error = %e, "store operation failed");
                json!({ "detail": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;
    use std::collections::HashMap;

    #[test]
    fn test_status_mapping() {
        let validation = ApiError::from(ValidationError::single(
            "Athlete",
            Violation::new("first_name", ViolationKind::Missing),
        ));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let reference = ApiError::InvalidReference {
            field: "athlete_id",
            value: "not-an-id".to_string(),
        };
        assert_eq!(reference.status(), StatusCode::BAD_REQUEST);
        assert_eq!(reference.to_string(), "Invalid athlete_id");

        let unavailable = ApiError::from(StoreError::Unavailable);
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let backend = ApiError::from(StoreError::Backend("boom".to_string()));
        assert_eq!(backend.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::from(StoreError::Unavailable).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_query_rejection_renders_json_detail() {
        let uri: Uri = "/api/athletes?limit=ten".parse().unwrap();
        let rejection = Query::<HashMap<String, u32>>::try_from_uri(&uri).unwrap_err();

        let err = ApiError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().unwrap().starts_with("invalid query"));
        assert_eq!(body["errors"][0]["field"], "query");
        assert_eq!(body["errors"][0]["kind"], "malformed");
    }
}
