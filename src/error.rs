use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::appointments::availability::{AvailabilityError, ConflictInfo};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("the requested slot overlaps an existing appointment")]
    SlotUnavailable(ConflictInfo),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AvailabilityError> for AppError {
    fn from(e: AvailabilityError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::InvalidInput(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::InvalidInput(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::InvalidInput(e.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::SlotUnavailable(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::InvalidInput(_) => "Invalid input",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Access denied",
            AppError::NotFound(_) => "Resource not found",
            AppError::Conflict(_) => "Resource conflict",
            AppError::SlotUnavailable(_) => "Slot unavailable",
            AppError::Internal(_) => "An internal server error occurred",
        };

        let body = match self {
            AppError::SlotUnavailable(ref info) => json!({
                "error": {
                    "message": message,
                    "details": self.to_string(),
                    "conflict": info,
                }
            }),
            AppError::Internal(ref e) => {
                // Internal details stay in the logs.
                error!(error = ?e, "internal error");
                json!({ "error": { "message": message } })
            }
            ref other => json!({
                "error": {
                    "message": message,
                    "details": other.to_string(),
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;
    use uuid::Uuid;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn slot_unavailable_reports_conflict_details() {
        let id = Uuid::new_v4();
        let res = AppError::SlotUnavailable(ConflictInfo {
            appointment_id: id,
            start: time!(15:00),
            end: time!(15:45),
            service: Some("Corte + Barba".into()),
        })
        .into_response();

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body = body_json(res).await;
        assert_eq!(body["error"]["message"], "Slot unavailable");
        assert_eq!(body["error"]["conflict"]["appointment_id"], id.to_string());
        assert_eq!(body["error"]["conflict"]["start"], "15:00:00");
        assert_eq!(body["error"]["conflict"]["end"], "15:45:00");
        assert_eq!(body["error"]["conflict"]["service"], "Corte + Barba");
    }

    #[tokio::test]
    async fn invalid_input_is_distinct_from_conflict() {
        let err: AppError = AvailabilityError::NonPositiveDuration(0).into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert!(body["error"]["details"]
            .as_str()
            .unwrap()
            .contains("positive"));
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let res = AppError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    }
}
