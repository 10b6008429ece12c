//! `/api/users/*`: registration, login, Google sign-in and the current user.

pub mod get;
pub mod post;

use crate::auth::guards::allow_authenticated;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use util::state::AppState;

/// - `POST /users/register/` → `register`
/// - `POST /users/login/` → `login`
/// - `POST /users/google-signin/` → `google_signin`
/// - `GET /users/me/` → `get_me` (authenticated)
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register/", post(post::register))
        .route("/users/login/", post(post::login))
        .route("/users/google-signin/", post(post::google_signin))
        .route(
            "/users/me/",
            get(get::get_me).route_layer(from_fn(allow_authenticated)),
        )
}
