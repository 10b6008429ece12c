//! `/api/students/*`, mounted behind `allow_student`.

use crate::auth::AuthUser;
use crate::response::{self, db_error};
use axum::{Extension, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use db::learning_path;
use util::state::AppState;

pub fn students_routes() -> Router<AppState> {
    Router::new()
        .route("/students/learning-path/", get(get_learning_path))
        .route("/students/dashboard/", get(get_dashboard))
}

/// GET /api/students/learning-path/
///
/// Progress for each approved course, the ten nearest uncompleted items
/// and the courses still awaiting enrollment approval.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "courses": [
///       { "course_id": 1, "title": "Algebra I", "subject_id": 1, "total_items": 5,
///         "completed_items": 2, "completion_percentage": 40.0, "average_score": 72.5 }
///     ],
///     "upcoming": [
///       { "kind": "exam", "id": 3, "course_id": 1, "course_title": "Algebra I",
///         "title": "Midterm", "due_date": "2025-11-01T09:00:00Z" }
///     ],
///     "pending_courses": [],
///     "overall_completion": 40.0
///   },
///   "message": "Learning path retrieved"
/// }
/// ```
/// - `401 Unauthorized`, `403 Forbidden` (not a student)
pub async fn get_learning_path(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    match learning_path::learning_path(app_state.db(), user.id()).await {
        Ok(path) => response::ok(StatusCode::OK, path, "Learning path retrieved"),
        Err(e) => db_error(e),
    }
}

/// GET /api/students/dashboard/
pub async fn get_dashboard(State(app_state): State<AppState>, Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    match learning_path::dashboard(app_state.db(), user.id()).await {
        Ok(dashboard) => response::ok(StatusCode::OK, dashboard, "Dashboard retrieved"),
        Err(e) => db_error(e),
    }
}
