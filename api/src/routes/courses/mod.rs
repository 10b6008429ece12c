//! Course routes module.
//!
//! Provides the `/courses` route group: the course catalogue, enrollment
//! requests and their approval, and the nested exam routes.
//!
//! Access control:
//! - Reading is open to any authenticated user; owner checks happen in the
//!   handlers.
//! - Creating courses needs an approved teacher (admins pass).
//! - Enrolling needs a student.

use crate::auth::guards::{allow_approved_teacher, allow_authenticated, allow_student};
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use util::state::AppState;

pub mod delete;
pub mod exams;
pub mod get;
pub mod post;
pub mod put;

/// Builds and returns the `/courses` route group.
///
/// Routes:
/// - `GET    /courses/`                                   → List courses
/// - `POST   /courses/`                                   → Create a course (approved teacher)
/// - `GET    /courses/{course_id}/`                       → Course details
/// - `DELETE /courses/{course_id}/`                       → Delete a course and everything in it (owner or admin)
/// - `POST   /courses/{course_id}/enroll/`                → Request enrollment (student)
/// - `GET    /courses/{course_id}/enrollments/`           → List enrollment requests (owner or admin)
/// - `PUT    /courses/{course_id}/enrollments/{id}/`      → Approve or reject a request (owner or admin)
///
/// Nested routes:
/// - Exam and attempt routes → `exams::exam_routes`
pub fn courses_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(
            Router::new()
                .route("/courses/", get(get::list_courses))
                .route(
                    "/courses/{course_id}/",
                    get(get::get_course).delete(delete::delete_course),
                )
                .route("/courses/{course_id}/enrollments/", get(get::list_enrollments))
                .route(
                    "/courses/{course_id}/enrollments/{enrollment_id}/",
                    put(put::decide_enrollment),
                )
                .route_layer(from_fn(allow_authenticated)),
        )
        .merge(
            Router::new()
                .route("/courses/", post(post::create_course))
                .route_layer(from_fn_with_state(app_state.clone(), allow_approved_teacher)),
        )
        .merge(
            Router::new()
                .route("/courses/{course_id}/enroll/", post(post::enroll))
                .route_layer(from_fn(allow_student)),
        )
        .merge(exams::exam_routes(app_state))
}
