use crate::auth::AuthUser;
use crate::response::{self, db_error, model_error};
use crate::routes::common::owned_course;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::course_enrollment::{self, EnrollmentStatus};
use sea_orm::EntityTrait;
use serde::Deserialize;
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnrollmentDecision {
    pub status: EnrollmentStatus,
}

/// PUT /api/courses/{course_id}/enrollments/{enrollment_id}/
///
/// ### Request Body
/// ```json
/// { "status": "approved" }
/// ```
///
/// ### Responses
/// - `200 OK` with the updated enrollment (`approved_at` set on approval)
/// - `400 Bad Request` (`pending` is not a decision)
/// - `403 Forbidden` (not the course teacher or an admin)
/// - `404 Not Found`
pub async fn decide_enrollment(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, enrollment_id)): Path<(i64, i64)>,
    Json(req): Json<EnrollmentDecision>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }

    match course_enrollment::Entity::find_by_id(enrollment_id).one(db).await {
        Ok(Some(e)) if e.course_id == course_id => {}
        Ok(_) => return response::error(StatusCode::NOT_FOUND, "Enrollment not found"),
        Err(e) => return db_error(e),
    }

    let result = match req.status {
        EnrollmentStatus::Approved => course_enrollment::Model::approve(db, enrollment_id).await,
        EnrollmentStatus::Rejected => course_enrollment::Model::reject(db, enrollment_id).await,
        EnrollmentStatus::Pending => {
            return response::error(StatusCode::BAD_REQUEST, "Status must be 'approved' or 'rejected'");
        }
    };

    match result {
        Ok(enrollment) => response::ok(StatusCode::OK, enrollment, "Enrollment updated"),
        Err(e) => model_error(e),
    }
}
