use super::{course_exam, find_attempt};
use crate::auth::AuthUser;
use crate::response::{self, model_error};
use crate::routes::common::owned_course;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{
    exam::{self, ExamStatus},
    exam_attempt::Model as Attempt,
};
use serde::Deserialize;
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: ExamStatus,
}

/// PUT /api/courses/{course_id}/exams/{exam_id}/status/
///
/// ### Request Body
/// ```json
/// { "status": "published" }
/// ```
///
/// ### Responses
/// - `200 OK` with the exam
/// - `400 Bad Request` (only `draft → published` and `published → completed` are allowed)
pub async fn change_status(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id)): Path<(i64, i64)>,
    Json(req): Json<StatusChange>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }
    if let Err(resp) = course_exam(db, course_id, exam_id).await {
        return resp;
    }

    match exam::Model::transition(db, exam_id, req.status).await {
        Ok(exam) => {
            tracing::info!(exam_id, status = %exam.status, "Exam status changed");
            response::ok(StatusCode::OK, exam, "Exam status updated")
        }
        Err(e) => model_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// PUT /api/courses/{course_id}/exams/{exam_id}/attempts/{attempt_id}/grade/
///
/// ### Request Body
/// ```json
/// { "score": 42.5, "feedback": "Good work" }
/// ```
///
/// ### Responses
/// - `200 OK` with the graded attempt (`percentage`, `graded_by`, `graded_at` set)
/// - `400 Bad Request` (attempt still open, or score outside `0..=total_marks`)
pub async fn grade_attempt(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id, attempt_id)): Path<(i64, i64, i64)>,
    Json(req): Json<GradeRequest>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }
    if let Err(resp) = course_exam(db, course_id, exam_id).await {
        return resp;
    }
    if let Err(resp) = find_attempt(db, exam_id, attempt_id).await {
        return resp;
    }

    match Attempt::grade(db, attempt_id, req.score, req.feedback, user.id()).await {
        Ok(attempt) => response::ok(StatusCode::OK, attempt, "Attempt graded"),
        Err(e) => model_error(e),
    }
}
