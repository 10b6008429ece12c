use crate::auth::AuthUser;
use crate::response::{self, Empty, db_error};
use crate::routes::common::owned_course;
use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::ModelTrait;
use util::state::AppState;

/// DELETE /api/courses/{course_id}/
///
/// Removes the course. Enrollments, assessments, assignments, exams and
/// their attempts go with it.
///
/// ### Responses
/// - `200 OK`
/// - `403 Forbidden` (not the course teacher or an admin)
/// - `404 Not Found`
pub async fn delete_course(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    let course = match owned_course(db, course_id, &user).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match course.delete(db).await {
        Ok(_) => {
            tracing::info!(course_id, by = user.id(), "Course deleted");
            response::ok(StatusCode::OK, Empty::default(), "Course deleted")
        }
        Err(e) => db_error(e),
    }
}
