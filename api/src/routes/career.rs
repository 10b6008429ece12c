use crate::auth::AuthUser;
use crate::response::{self, db_error};
use axum::{Extension, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use db::career;
use util::state::AppState;

pub fn career_routes() -> Router<AppState> {
    Router::new().route("/career/recommendations/", get(get_recommendations))
}

/// GET /api/career/recommendations/
///
/// One entry per subject the student has graded work in, strongest first.
/// Bands: `strong` at 75% and above, `developing` at 50% and above,
/// otherwise `needs_support`.
pub async fn get_recommendations(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    match career::recommendations(app_state.db(), user.id()).await {
        Ok(recs) => response::ok(StatusCode::OK, recs, "Career recommendations retrieved"),
        Err(e) => db_error(e),
    }
}
