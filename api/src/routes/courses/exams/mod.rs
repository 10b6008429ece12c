//! Exam routes nested under `/courses/{course_id}/exams`.
//!
//! Exams move `draft → published → completed`. Students start attempts on
//! published exams of courses they are enrolled in and hold at most one open
//! attempt per exam.

use crate::response::{self, db_error};
use crate::auth::guards::{allow_approved_teacher, allow_authenticated, allow_student};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::Response,
    routing::{get, post, put},
};
use db::models::{exam, exam_attempt};
use sea_orm::{DatabaseConnection, EntityTrait};
use util::state::AppState;

pub mod get;
pub mod post;
pub mod put;

/// Routes:
/// - `GET  /courses/{course_id}/exams/`                                     → List exams
/// - `POST /courses/{course_id}/exams/`                                     → Create a draft exam (owner)
/// - `POST /courses/{course_id}/exams/{exam_id}/questions/`                 → Upload the questions file (owner, multipart)
/// - `PUT  /courses/{course_id}/exams/{exam_id}/status/`                    → Publish or complete (owner)
/// - `GET  /courses/{course_id}/exams/{exam_id}/attempts/`                  → Attempts (owner: all, student: own)
/// - `POST /courses/{course_id}/exams/{exam_id}/attempts/`                  → Start an attempt (student)
/// - `POST /courses/{course_id}/exams/{exam_id}/attempts/{id}/submit/`      → Submit an attempt (student, multipart)
/// - `PUT  /courses/{course_id}/exams/{exam_id}/attempts/{id}/grade/`       → Grade (owner)
/// - `POST /courses/{course_id}/exams/{exam_id}/attempts/{id}/ai-detection/` → Record an AI-detection result (owner)
pub fn exam_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(
            Router::new()
                .route("/courses/{course_id}/exams/", get(get::list_exams))
                .route("/courses/{course_id}/exams/{exam_id}/attempts/", get(get::list_attempts))
                .route_layer(from_fn(allow_authenticated)),
        )
        .merge(
            Router::new()
                .route("/courses/{course_id}/exams/", post(post::create_exam))
                .route(
                    "/courses/{course_id}/exams/{exam_id}/questions/",
                    post(post::upload_questions),
                )
                .route("/courses/{course_id}/exams/{exam_id}/status/", put(put::change_status))
                .route(
                    "/courses/{course_id}/exams/{exam_id}/attempts/{attempt_id}/grade/",
                    put(put::grade_attempt),
                )
                .route(
                    "/courses/{course_id}/exams/{exam_id}/attempts/{attempt_id}/ai-detection/",
                    post(post::record_attempt_ai_detection),
                )
                .route_layer(from_fn_with_state(app_state, allow_approved_teacher)),
        )
        .merge(
            Router::new()
                .route("/courses/{course_id}/exams/{exam_id}/attempts/", post(post::start_attempt))
                .route(
                    "/courses/{course_id}/exams/{exam_id}/attempts/{attempt_id}/submit/",
                    post(post::submit_attempt),
                )
                .route_layer(from_fn(allow_student)),
        )
        .layer(DefaultBodyLimit::disable())
}

/// The exam, provided it belongs to the course.
pub async fn course_exam(db: &DatabaseConnection, course_id: i64, exam_id: i64) -> Result<exam::Model, Response> {
    match exam::Entity::find_by_id(exam_id).one(db).await {
        Ok(Some(e)) if e.course_id == course_id => Ok(e),
        Ok(_) => Err(response::error(StatusCode::NOT_FOUND, "Exam not found")),
        Err(e) => Err(db_error(e)),
    }
}

/// The attempt, provided it belongs to the exam.
pub async fn find_attempt(
    db: &DatabaseConnection,
    exam_id: i64,
    attempt_id: i64,
) -> Result<exam_attempt::Model, Response> {
    match exam_attempt::Entity::find_by_id(attempt_id).one(db).await {
        Ok(Some(a)) if a.exam_id == exam_id => Ok(a),
        Ok(_) => Err(response::error(StatusCode::NOT_FOUND, "Attempt not found")),
        Err(e) => Err(db_error(e)),
    }
}
