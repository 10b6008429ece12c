use super::owned_answer;
use crate::auth::AuthUser;
use crate::response::{self, model_error};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::student_answer;
use serde::Deserialize;
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub score: f64,
}

/// PUT /api/assessments/answers/{answer_id}/grade/
///
/// ### Request Body
/// ```json
/// { "score": 17.5 }
/// ```
///
/// ### Responses
/// - `200 OK` with the graded answer
/// - `400 Bad Request` (score outside `0..=total_marks`)
/// - `403 Forbidden`
/// - `404 Not Found`
pub async fn grade_answer(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(answer_id): Path<i64>,
    Json(req): Json<ScoreRequest>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_answer(db, answer_id, &user).await {
        return resp;
    }

    match student_answer::Model::grade(db, answer_id, req.score).await {
        Ok(answer) => response::ok(StatusCode::OK, answer, "Answer graded"),
        Err(e) => model_error(e),
    }
}
