//! `/api/accessibility/*`: the public feature catalogue and per-user
//! preferences.

use crate::auth::{AuthUser, guards::allow_authenticated};
use crate::response::{self, db_error, model_error};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
};
use db::models::accessibility_preference::{self, PreferencesUpdate};
use serde::Serialize;
use util::state::AppState;

pub fn accessibility_routes() -> Router<AppState> {
    Router::new()
        .route("/accessibility/features/", get(list_features))
        .route(
            "/accessibility/preferences/",
            get(get_preferences)
                .put(update_preferences)
                .route_layer(from_fn(allow_authenticated)),
        )
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Feature {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const FEATURES: [Feature; 6] = [
    Feature {
        key: "font_scale",
        name: "Text size",
        description: "Scale all text between 50% and 300%.",
    },
    Feature {
        key: "high_contrast",
        name: "High contrast",
        description: "Stronger colour contrast for text and controls.",
    },
    Feature {
        key: "dyslexia_font",
        name: "Dyslexia-friendly font",
        description: "Switch to a typeface designed for readers with dyslexia.",
    },
    Feature {
        key: "screen_reader",
        name: "Screen reader support",
        description: "Extra labels and landmarks for assistive technology.",
    },
    Feature {
        key: "reduce_motion",
        name: "Reduce motion",
        description: "Disable animations and auto-playing transitions.",
    },
    Feature {
        key: "text_to_speech",
        name: "Text to speech",
        description: "Read questions and course material aloud.",
    },
];

/// GET /api/accessibility/features/
pub async fn list_features() -> impl IntoResponse {
    response::ok(StatusCode::OK, FEATURES, "Accessibility features retrieved")
}

/// GET /api/accessibility/preferences/
///
/// Created with defaults on first read.
pub async fn get_preferences(State(app_state): State<AppState>, Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    match accessibility_preference::Model::get_or_create(app_state.db(), user.id()).await {
        Ok(prefs) => response::ok(StatusCode::OK, prefs, "Preferences retrieved"),
        Err(e) => db_error(e),
    }
}

/// PUT /api/accessibility/preferences/
///
/// ### Request Body
/// ```json
/// { "font_scale": 1.5, "high_contrast": true }
/// ```
///
/// ### Responses
/// - `200 OK`
/// - `400 Bad Request` (`font_scale` outside 0.5–3.0)
pub async fn update_preferences(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(changes): Json<PreferencesUpdate>,
) -> impl IntoResponse {
    match accessibility_preference::Model::update(app_state.db(), user.id(), changes).await {
        Ok(prefs) => response::ok(StatusCode::OK, prefs, "Preferences updated"),
        Err(e) => model_error(e),
    }
}
