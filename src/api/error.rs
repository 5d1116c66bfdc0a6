//! Error responses for the HTTP API

use crate::error::TournamentError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// Error type for API handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation_error",
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        let status = match &err {
            TournamentError::Validation { .. } | TournamentError::Import { .. } => {
                StatusCode::BAD_REQUEST
            }
            TournamentError::NotFound { .. } => StatusCode::NOT_FOUND,
            TournamentError::Conflict { .. } => StatusCode::CONFLICT,
            TournamentError::Export { .. }
            | TournamentError::Persistence { .. }
            | TournamentError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.message);
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TournamentError::validation("bad"), StatusCode::BAD_REQUEST),
            (TournamentError::import("bad file"), StatusCode::BAD_REQUEST),
            (TournamentError::driver_not_found("A"), StatusCode::NOT_FOUND),
            (TournamentError::driver_conflict("A"), StatusCode::CONFLICT),
            (
                TournamentError::persistence("disk"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TournamentError::export("xlsx"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::from(TournamentError::driver_conflict("Alice")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            ErrorBody {
                success: false,
                error: "conflict".to_string(),
                message: "Driver already exists: Alice".to_string(),
            }
        );
    }
}
