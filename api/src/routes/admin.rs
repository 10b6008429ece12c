//! `/admin/` index and `/api/admin/system-settings/`.

use crate::auth::{
    AuthUser,
    guards::{allow_admin, allow_authenticated},
};
use crate::response::{self, db_error, model_error};
use crate::routes::common::settings;
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, put},
};
use db::{
    analytics,
    models::system_setting::{self, SettingsUpdate},
};
use util::state::AppState;

/// GET /admin/
///
/// Row count for every platform table. Admin only.
pub async fn admin_index(State(app_state): State<AppState>) -> impl IntoResponse {
    match analytics::table_counts(app_state.db()).await {
        Ok(counts) => response::ok(StatusCode::OK, counts, "Table counts retrieved"),
        Err(e) => db_error(e),
    }
}

/// - `GET /admin/system-settings/` (authenticated)
/// - `PUT /admin/system-settings/` (admin)
pub fn system_settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/system-settings/",
            put(update_settings).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/admin/system-settings/",
            get(get_settings).route_layer(from_fn(allow_authenticated)),
        )
}

/// GET /api/admin/system-settings/
///
/// Returns the settings row, creating it with defaults on first read.
pub async fn get_settings(State(app_state): State<AppState>) -> impl IntoResponse {
    match settings(app_state.db()).await {
        Ok(s) => response::ok(StatusCode::OK, s, "System settings retrieved"),
        Err(resp) => resp,
    }
}

/// PUT /api/admin/system-settings/
///
/// Partial update. Omitted fields keep their value.
///
/// ### Request Body
/// ```json
/// { "allow_registration": false, "ai_flag_threshold": 80.0, "max_upload_mb": 25 }
/// ```
///
/// ### Responses
/// - `200 OK` with the updated settings
/// - `400 Bad Request` (threshold outside 0–100, upload limit outside 1–1024, blank site name)
pub async fn update_settings(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(changes): Json<SettingsUpdate>,
) -> impl IntoResponse {
    match system_setting::Model::update(app_state.db(), changes, user.id()).await {
        Ok(s) => {
            tracing::info!(admin_id = user.id(), "System settings updated");
            response::ok(StatusCode::OK, s, "System settings updated")
        }
        Err(e) => model_error(e),
    }
}
