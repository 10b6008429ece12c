use crate::auth::AuthUser;
use crate::response::{self, db_error};
use crate::routes::common::{find_course, owned_course};
use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{course, course_enrollment, subject, user};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `true` limits the list to courses the caller teaches.
    #[serde(default)]
    pub mine: bool,
}

/// GET /api/courses/
///
/// Lists every course ordered by title. With `?mine=true` only the courses
/// taught by the caller are returned.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     { "id": 1, "title": "Algebra I", "description": "...", "subject_id": 1, "teacher_id": 2, ... }
///   ],
///   "message": "Courses retrieved"
/// }
/// ```
pub async fn list_courses(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let db = app_state.db();
    let courses = if query.mine {
        course::Model::find_by_teacher(db, user.id()).await
    } else {
        course::Model::list(db).await
    };

    match courses {
        Ok(courses) => response::ok(StatusCode::OK, courses, "Courses retrieved"),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: course::Model,
    pub subject: Option<subject::Model>,
    pub teacher_name: String,
    /// The caller's own enrollment, if any.
    pub enrollment: Option<course_enrollment::Model>,
}

/// GET /api/courses/{course_id}/
pub async fn get_course(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    let course = match find_course(db, course_id).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let subject = match course.subject_id {
        Some(id) => match subject::Entity::find_by_id(id).one(db).await {
            Ok(s) => s,
            Err(e) => return db_error(e),
        },
        None => None,
    };
    let teacher_name = match user::Entity::find_by_id(course.teacher_id).one(db).await {
        Ok(Some(t)) => t.full_name(),
        Ok(None) => String::new(),
        Err(e) => return db_error(e),
    };
    let enrollment = match course_enrollment::Model::find(db, course.id, user.id()).await {
        Ok(e) => e,
        Err(e) => return db_error(e),
    };

    response::ok(
        StatusCode::OK,
        CourseDetail {
            course,
            subject,
            teacher_name,
            enrollment,
        },
        "Course retrieved",
    )
}

/// GET /api/courses/{course_id}/enrollments/
///
/// Every enrollment request for the course, oldest first.
///
/// ### Responses
/// - `200 OK`
/// - `403 Forbidden` (not the course teacher or an admin)
/// - `404 Not Found`
pub async fn list_enrollments(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }

    match course_enrollment::Model::for_course(db, course_id).await {
        Ok(rows) => response::ok(StatusCode::OK, rows, "Enrollments retrieved"),
        Err(e) => db_error(e),
    }
}
