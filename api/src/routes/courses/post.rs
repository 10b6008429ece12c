use crate::auth::AuthUser;
use crate::response::{self, db_error, format_validation_errors, model_error};
use crate::routes::common::find_course;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{course, course_enrollment, subject};
use sea_orm::EntityTrait;
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject_id: Option<i64>,
}

/// POST /api/courses/
///
/// Creates a course owned by the caller.
///
/// ### Request Body
/// ```json
/// { "title": "Algebra I", "description": "Linear equations", "subject_id": 1 }
/// ```
///
/// ### Responses
/// - `201 Created` with the course
/// - `400 Bad Request` (invalid title or unknown subject)
/// - `403 Forbidden` (teacher not yet approved)
pub async fn create_course(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateCourseRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    if let Err(e) = req.validate() {
        return response::error(StatusCode::BAD_REQUEST, format_validation_errors(&e));
    }

    if let Some(subject_id) = req.subject_id {
        match subject::Entity::find_by_id(subject_id).one(db).await {
            Ok(Some(_)) => {}
            Ok(None) => return response::error(StatusCode::BAD_REQUEST, "Unknown subject"),
            Err(e) => return db_error(e),
        }
    }

    match course::Model::create(db, user.id(), req.title.trim(), &req.description, req.subject_id).await {
        Ok(course) => {
            tracing::info!(course_id = course.id, teacher_id = user.id(), "Course created");
            response::ok(StatusCode::CREATED, course, "Course created")
        }
        Err(e) => db_error(e),
    }
}

/// POST /api/courses/{course_id}/enroll/
///
/// Files a pending enrollment request for the calling student.
///
/// ### Responses
/// - `201 Created` with the pending enrollment
/// - `404 Not Found` (no such course)
/// - `409 Conflict` (already enrolled or awaiting approval)
pub async fn enroll(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = find_course(db, course_id).await {
        return resp;
    }

    match course_enrollment::Model::request(db, course_id, user.id()).await {
        Ok(enrollment) => response::ok(StatusCode::CREATED, enrollment, "Enrollment requested"),
        Err(e) => model_error(e),
    }
}
