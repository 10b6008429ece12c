use super::course_exam;
use crate::auth::AuthUser;
use crate::response::{self, db_error};
use crate::routes::common::{find_course, require_enrollment};
use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{
    exam::{self, ExamStatus},
    exam_attempt,
    user::Role,
};
use util::state::AppState;

/// GET /api/courses/{course_id}/exams/
///
/// The course teacher and admins see every exam. Enrolled students see
/// published and completed exams only.
///
/// ### Responses
/// - `200 OK`
/// - `403 Forbidden` (not enrolled, or another teacher's course)
/// - `404 Not Found`
pub async fn list_exams(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    let course = match find_course(db, course_id).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let staff = user.is_admin() || course.is_owner(user.id());
    if !staff {
        if user.role() != Role::Student {
            return response::error(StatusCode::FORBIDDEN, "Only the course teacher can do this");
        }
        if let Err(resp) = require_enrollment(db, course_id, &user).await {
            return resp;
        }
    }

    match exam::Model::for_course(db, course_id).await {
        Ok(exams) => {
            let exams: Vec<_> = exams
                .into_iter()
                .filter(|e| staff || e.status != ExamStatus::Draft)
                .collect();
            response::ok(StatusCode::OK, exams, "Exams retrieved")
        }
        Err(e) => db_error(e),
    }
}

/// GET /api/courses/{course_id}/exams/{exam_id}/attempts/
///
/// The course teacher and admins get every attempt; a student gets only
/// their own.
pub async fn list_attempts(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let db = app_state.db();
    let course = match find_course(db, course_id).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let exam = match course_exam(db, course_id, exam_id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    let attempts = if user.is_admin() || course.is_owner(user.id()) {
        exam_attempt::Model::for_exam(db, exam.id).await
    } else if user.role() == Role::Student {
        exam_attempt::Model::for_student(db, exam.id, user.id()).await
    } else {
        return response::error(StatusCode::FORBIDDEN, "Only the course teacher can do this");
    };

    match attempts {
        Ok(rows) => response::ok(StatusCode::OK, rows, "Attempts retrieved"),
        Err(e) => db_error(e),
    }
}
