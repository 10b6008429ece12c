use super::owned_submission;
use crate::auth::AuthUser;
use crate::response::{self, model_error};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::assignment_submission;
use serde::Deserialize;
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// PUT /api/assessments/submissions/{submission_id}/grade/
///
/// ### Request Body
/// ```json
/// { "score": 88, "feedback": "Well structured" }
/// ```
pub async fn grade_submission(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(submission_id): Path<i64>,
    Json(req): Json<GradeRequest>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_submission(db, submission_id, &user).await {
        return resp;
    }

    match assignment_submission::Model::grade(db, submission_id, req.score, req.feedback).await {
        Ok(submission) => response::ok(StatusCode::OK, submission, "Submission graded"),
        Err(e) => model_error(e),
    }
}
