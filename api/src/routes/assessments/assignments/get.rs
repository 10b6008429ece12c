use super::find_assignment;
use crate::auth::AuthUser;
use crate::response::{self, db_error};
use crate::routes::assessments::{CourseFilter, get::course_reader};
use crate::routes::common::find_course;
use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{assignment, assignment_submission};
use util::state::AppState;

/// GET /api/assessments/assignments/?course_id={course_id}
pub async fn list_assignments(
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

    match assignment::Model::for_course(db, course_id).await {
        Ok(rows) => response::ok(StatusCode::OK, rows, "Assignments retrieved"),
        Err(e) => db_error(e),
    }
}

/// GET /api/assessments/assignments/{assignment_id}/submissions/
pub async fn list_submissions(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assignment_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    let assignment = match find_assignment(db, assignment_id).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let course = match find_course(db, assignment.course_id).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let staff = match course_reader(db, &course, &user).await {
        Ok(staff) => staff,
        Err(resp) => return resp,
    };

    let submissions = if staff {
        assignment_submission::Model::for_assignment(db, assignment.id).await
    } else {
        assignment_submission::Model::find(db, assignment.id, user.id())
            .await
            .map(|s| s.into_iter().collect())
    };

    match submissions {
        Ok(rows) => response::ok(StatusCode::OK, rows, "Submissions retrieved"),
        Err(e) => db_error(e),
    }
}
