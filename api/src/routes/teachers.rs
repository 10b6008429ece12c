//! `/api/teachers/*`: analytics for approved teachers and approval by admins.

use crate::auth::{
    AuthUser,
    guards::{allow_admin, allow_approved_teacher},
};
use crate::response::{self, db_error};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, put},
};
use db::{
    analytics,
    models::{
        teacher_profile::{self, ApprovalStatus},
        user::{self, Role},
    },
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use util::state::AppState;

/// - `GET /teachers/analytics/` (approved teacher or admin)
/// - `GET /teachers/pending/` (admin)
/// - `PUT /teachers/{user_id}/approval/` (admin)
pub fn teachers_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/teachers/analytics/",
            get(get_analytics).route_layer(from_fn_with_state(app_state, allow_approved_teacher)),
        )
        .merge(
            Router::new()
                .route("/teachers/pending/", get(list_pending))
                .route("/teachers/{user_id}/approval/", put(set_approval))
                .route_layer(from_fn(allow_admin)),
        )
}

/// GET /api/teachers/analytics/
///
/// Per-course figures and totals for every course the caller teaches.
///
/// ### Responses
/// - `200 OK`
/// - `401 Unauthorized`
/// - `403 Forbidden` (`Teacher account is awaiting approval` while pending)
pub async fn get_analytics(State(app_state): State<AppState>, Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    match analytics::teacher_analytics(app_state.db(), user.id()).await {
        Ok(report) => response::ok(StatusCode::OK, report, "Teacher analytics retrieved"),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Serialize)]
pub struct PendingTeacher {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub specialization: String,
    pub registered_at: String,
}

/// GET /api/teachers/pending/
pub async fn list_pending(State(app_state): State<AppState>) -> impl IntoResponse {
    let db = app_state.db();

    let rows = match teacher_profile::Entity::find()
        .filter(teacher_profile::Column::ApprovalStatus.eq(ApprovalStatus::Pending))
        .find_also_related(user::Entity)
        .all(db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return db_error(e),
    };

    let pending: Vec<PendingTeacher> = rows
        .into_iter()
        .filter_map(|(profile, user)| {
            user.map(|u| PendingTeacher {
                user_id: u.id,
                username: u.username,
                email: u.email,
                specialization: profile.specialization,
                registered_at: u.created_at.to_rfc3339(),
            })
        })
        .collect();

    response::ok(StatusCode::OK, pending, "Pending teachers retrieved")
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub status: ApprovalStatus,
}

/// PUT /api/teachers/{user_id}/approval/
///
/// ### Request Body
/// ```json
/// { "status": "approved" }
/// ```
///
/// ### Responses
/// - `200 OK` with the updated profile
/// - `404 Not Found` (no such teacher)
pub async fn set_approval(
    State(app_state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Json(req): Json<ApprovalRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    match user::Entity::find_by_id(user_id).one(db).await {
        Ok(Some(u)) if u.role == Role::Teacher => {}
        Ok(_) => return response::error(StatusCode::NOT_FOUND, "Teacher not found"),
        Err(e) => return db_error(e),
    }

    match teacher_profile::Model::set_approval(db, user_id, req.status).await {
        Ok(profile) => {
            tracing::info!(admin_id = admin.id(), teacher_id = user_id, status = %req.status, "Teacher approval changed");
            response::ok(StatusCode::OK, profile, "Approval status updated")
        }
        Err(e) => db_error(e),
    }
}
