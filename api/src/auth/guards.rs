//! Route-layer guards applied with `axum::middleware::from_fn`.
//!
//! Each guard authenticates the request, inserts the `AuthUser` into the
//! request extensions for downstream handlers and checks the caller's role.

use crate::auth::claims::AuthUser;
use crate::response::{ApiResponse, Empty};
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::{teacher_profile, user::Role};
use util::state::AppState;

type GuardRejection = (StatusCode, Json<ApiResponse<Empty>>);

async fn extract_and_insert_authuser(req: Request<Body>) -> Result<(Request<Body>, AuthUser), GuardRejection> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &()).await.map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Authentication required")),
        )
    })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

fn forbidden(message: &str) -> GuardRejection {
    (StatusCode::FORBIDDEN, Json(ApiResponse::error(message)))
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, _user) = extract_and_insert_authuser(req).await?;
    Ok(next.run(req).await)
}

/// Admin-only guard.
pub async fn allow_admin(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    if !user.is_admin() {
        return Err(forbidden("Admin access required"));
    }

    Ok(next.run(req).await)
}

/// Student-only guard.
pub async fn allow_student(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    if user.role() != Role::Student {
        return Err(forbidden("Student access required"));
    }

    Ok(next.run(req).await)
}

/// Teachers pass once an administrator has approved their profile. Admins
/// always pass. A pending teacher can still log in but is refused here.
pub async fn allow_approved_teacher(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    match user.role() {
        Role::Admin => Ok(next.run(req).await),
        Role::Teacher => match teacher_profile::Model::is_approved(app_state.db(), user.id()).await {
            Ok(true) => Ok(next.run(req).await),
            Ok(false) => Err(forbidden("Teacher account is awaiting approval")),
            Err(e) => {
                tracing::warn!(error = %e, user_id = user.id(), "DB error while checking approval; denying access");
                Err(forbidden("Teacher account is awaiting approval"))
            }
        },
        Role::Student => Err(forbidden("Teacher access required")),
    }
}
