use super::{CourseFilter, find_assessment};
use crate::auth::AuthUser;
use crate::response::{self, db_error};
use crate::routes::common::{find_course, require_enrollment};
use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{assessment, course, student_answer, user::Role};
use sea_orm::DatabaseConnection;
use util::state::AppState;

/// Staff see everything in their course; students need an approved
/// enrollment. Returns whether the caller is staff for the course.
pub async fn course_reader(db: &DatabaseConnection, course: &course::Model, user: &AuthUser) -> Result<bool, Response> {
    if user.is_admin() || course.is_owner(user.id()) {
        return Ok(true);
    }
    if user.role() != Role::Student {
        return Err(response::error(StatusCode::FORBIDDEN, "Only the course teacher can do this"));
    }
    require_enrollment(db, course.id, user).await?;
    Ok(false)
}

/// GET /api/assessments/?course_id={course_id}
///
/// ### Responses
/// - `200 OK` with the course's assessments
/// - `400 Bad Request` (missing `course_id`)
/// - `403 Forbidden` (not enrolled)
/// - `404 Not Found` (no such course)
pub async fn list_assessments(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<CourseFilter>,
) -> impl IntoResponse {
    let db = app_state.db();
    let Some(course_id) = filter.course_id else {
        return response::error(StatusCode::BAD_REQUEST, "course_id query parameter is required");
    };
    let course = match find_course(db, course_id).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if let Err(resp) = course_reader(db, &course, &user).await {
        return resp;
    }

    match assessment::Model::for_course(db, course_id).await {
        Ok(rows) => response::ok(StatusCode::OK, rows, "Assessments retrieved"),
        Err(e) => db_error(e),
    }
}

/// GET /api/assessments/{assessment_id}/answers/
///
/// The course teacher gets every answer; a student gets their own (zero or
/// one entries).
pub async fn list_answers(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assessment_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    let assessment = match find_assessment(db, assessment_id).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let course = match find_course(db, assessment.course_id).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let staff = match course_reader(db, &course, &user).await {
        Ok(staff) => staff,
        Err(resp) => return resp,
    };

    let answers = if staff {
        student_answer::Model::for_assessment(db, assessment.id).await
    } else {
        student_answer::Model::find(db, assessment.id, user.id())
            .await
            .map(|a| a.into_iter().collect())
    };

    match answers {
        Ok(rows) => response::ok(StatusCode::OK, rows, "Answers retrieved"),
        Err(e) => db_error(e),
    }
}
