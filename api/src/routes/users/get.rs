use crate::auth::AuthUser;
use crate::response::{self, db_error};
use crate::routes::common::UserResponse;
use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use db::models::{student_profile, teacher_profile, user};
use sea_orm::EntityTrait;
use serde::Serialize;
use util::state::AppState;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileResponse {
    Student(student_profile::Model),
    Teacher(teacher_profile::Model),
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
}

/// GET /api/users/me/
///
/// Returns the authenticated user and their role profile. Admins have no
/// profile.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "user": { "id": 4, "username": "jdoe", "role": "teacher", ... },
///     "profile": { "kind": "teacher", "approval_status": "pending", ... }
///   },
///   "message": "User fetched successfully"
/// }
/// ```
/// - `401 Unauthorized`
/// - `404 Not Found` (the account was deleted after the token was issued)
pub async fn get_me(State(app_state): State<AppState>, Extension(claims): Extension<AuthUser>) -> impl IntoResponse {
    let db = app_state.db();

    let user = match user::Entity::find_by_id(claims.id()).one(db).await {
        Ok(Some(u)) => u,
        Ok(None) => return response::error(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return db_error(e),
    };

    let profile = match user.role {
        user::Role::Student => student_profile::Model::find_by_user(db, user.id)
            .await
            .map(|p| p.map(ProfileResponse::Student)),
        user::Role::Teacher => teacher_profile::Model::find_by_user(db, user.id)
            .await
            .map(|p| p.map(ProfileResponse::Teacher)),
        user::Role::Admin => Ok(None),
    };
    let profile = match profile {
        Ok(p) => p,
        Err(e) => return db_error(e),
    };

    response::ok(
        StatusCode::OK,
        MeResponse {
            user: user.into(),
            profile,
        },
        "User fetched successfully",
    )
}
