use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::ModelError;
use sea_orm::DbErr;
use serde::Serialize;
use validator::ValidationErrors;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
///
/// Error responses carry `success: false` and a default `data` payload.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Serializes as `{}`; used as the payload of error responses.
#[derive(Serialize, Default, Debug, Clone, Copy)]
pub struct Empty {}

pub fn ok<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    (status, Json(ApiResponse::success(data, message))).into_response()
}

pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<Empty>::error(message))).into_response()
}

/// Logs the database error and hides its details from the client.
pub fn db_error(err: DbErr) -> Response {
    match err {
        DbErr::RecordNotFound(msg) => error(StatusCode::NOT_FOUND, msg),
        other => {
            tracing::error!(error = %other, "Database error");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

pub fn model_error(err: ModelError) -> Response {
    match err {
        ModelError::Db(e) => db_error(e),
        ModelError::NotFound(what) => error(StatusCode::NOT_FOUND, format!("{what} not found")),
        ModelError::Invalid(msg) => error(StatusCode::BAD_REQUEST, msg),
        ModelError::Conflict(msg) => error(StatusCode::CONFLICT, msg),
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter().filter_map(|e| e.message.as_ref().map(|m| m.to_string())))
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn model_errors_map_to_status_codes() {
        let resp = model_error(ModelError::invalid("bad score"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "bad score");
        assert_eq!(json["data"], serde_json::json!({}));

        assert_eq!(model_error(ModelError::NotFound("Exam")).status(), StatusCode::NOT_FOUND);
        assert_eq!(model_error(ModelError::conflict("dup")).status(), StatusCode::CONFLICT);
        assert_eq!(
            db_error(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
