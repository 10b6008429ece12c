//! `/api/analytics/*`.

use crate::auth::{
    AuthUser,
    guards::{allow_admin, allow_authenticated},
};
use crate::response::{self, db_error};
use crate::routes::common::owned_course;
use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
};
use db::analytics;
use util::state::AppState;

/// - `GET /analytics/overview/` (admin)
/// - `GET /analytics/courses/{course_id}/` (course teacher or admin)
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/analytics/overview/",
            get(get_overview).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/analytics/courses/{course_id}/",
            get(get_course_analytics).route_layer(from_fn(allow_authenticated)),
        )
}

/// GET /api/analytics/overview/
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "users": { "students": 120, "teachers": 8, "admins": 1 },
///     "pending_teachers": 2,
///     "courses": 14,
///     "ai_flagged": 3,
///     ...
///   },
///   "message": "Platform overview retrieved"
/// }
/// ```
pub async fn get_overview(State(app_state): State<AppState>) -> impl IntoResponse {
    match analytics::platform_overview(app_state.db()).await {
        Ok(overview) => response::ok(StatusCode::OK, overview, "Platform overview retrieved"),
        Err(e) => db_error(e),
    }
}

/// GET /api/analytics/courses/{course_id}/
pub async fn get_course_analytics(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();
    let course = match owned_course(db, course_id, &user).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match analytics::course_analytics(db, &course).await {
        Ok(report) => response::ok(StatusCode::OK, report, "Course analytics retrieved"),
        Err(e) => db_error(e),
    }
}
