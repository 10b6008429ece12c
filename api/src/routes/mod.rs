//! HTTP route entry point.
//!
//! Route groups under `/api`:
//! - `/health` → Health check (public)
//! - `/admin/system-settings` → Platform settings (read: authenticated, write: admin)
//! - `/users` → Registration, login, Google sign-in, current user
//! - `/students` → Learning path and dashboard (students)
//! - `/teachers` → Teacher analytics and approval
//! - `/courses` → Courses, enrollments, exams and attempts
//! - `/assessments` → Assessments, answers, assignments and submissions
//! - `/analytics` → Platform overview and per-course analytics
//! - `/career` → Subject-strength recommendations (students)
//! - `/chatbot` → Help assistant over the caller's own data
//! - `/accessibility` → Feature catalogue and per-user preferences
//!
//! `/admin/` is mounted outside `/api` and lists row counts per table.
//! Every path ends with a trailing slash.

use crate::auth::guards::{allow_admin, allow_authenticated, allow_student};
use axum::{Router, middleware::from_fn, routing::get};
use util::state::AppState;

pub mod accessibility;
pub mod admin;
pub mod analytics;
pub mod assessments;
pub mod career;
pub mod chatbot;
pub mod common;
pub mod courses;
pub mod health;
pub mod students;
pub mod teachers;
pub mod users;

/// Builds the `/api` router. Each group declares its own full paths so the
/// group root keeps its trailing slash (`/api/courses/`).
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::health_routes())
        .merge(admin::system_settings_routes())
        .merge(users::users_routes())
        .merge(students::students_routes().route_layer(from_fn(allow_student)))
        .merge(teachers::teachers_routes(app_state.clone()))
        .merge(courses::courses_routes(app_state.clone()))
        .merge(assessments::assessments_routes(app_state.clone()))
        .merge(analytics::analytics_routes())
        .merge(career::career_routes().route_layer(from_fn(allow_student)))
        .merge(chatbot::chatbot_routes().route_layer(from_fn(allow_authenticated)))
        .merge(accessibility::accessibility_routes())
}

/// The complete application: `/api/...` plus the `/admin/` index.
pub fn app_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/admin/",
            get(admin::admin_index).route_layer(from_fn(allow_admin)),
        )
        .nest("/api", routes(app_state.clone()))
        .with_state(app_state)
}
