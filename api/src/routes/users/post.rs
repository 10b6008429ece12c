use crate::auth::generate_jwt;
use crate::response::{self, ApiResponse, db_error, format_validation_errors};
use crate::routes::common::{UserResponse, settings};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::error::is_unique_violation;
use db::models::{
    student_profile,
    teacher_profile::{self, ApprovalStatus},
    user::{self, Role},
};
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};
use serde::{Deserialize, Serialize};
use util::{config, state::AppState};
use validator::Validate;

lazy_static::lazy_static! {
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9._-]{3,150}$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be 3-150 letters, digits, '.', '_' or '-'"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// `student` (default) or `teacher`.
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150, message = "First name is too long"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Last name is too long"))]
    pub last_name: String,

    #[serde(default)]
    pub specialization: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
    /// Present for teacher accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
}

fn issue_token(user: user::Model, approval_status: Option<ApprovalStatus>) -> Result<AuthResponse, Response> {
    let (token, expires_at) = generate_jwt(user.id, user.role).map_err(|e| {
        tracing::error!(error = %e, "Token encoding failed");
        response::error(StatusCode::INTERNAL_SERVER_ERROR, "Could not issue token")
    })?;
    Ok(AuthResponse {
        token,
        expires_at,
        user: user.into(),
        approval_status,
    })
}

async fn approval_of(db: &sea_orm::DatabaseConnection, user: &user::Model) -> Result<Option<ApprovalStatus>, Response> {
    if user.role != Role::Teacher {
        return Ok(None);
    }
    Ok(teacher_profile::Model::find_by_user(db, user.id)
        .await
        .map_err(db_error)?
        .map(|p| p.approval_status))
}

/// POST /api/users/register/
///
/// Creates a student or teacher account together with its profile. Teacher
/// profiles start `pending` until an administrator approves them.
///
/// ### Request Body
/// ```json
/// {
///   "username": "jdoe",
///   "email": "jdoe@example.com",
///   "password": "strongpassword",
///   "role": "student",
///   "first_name": "Jane",
///   "last_name": "Doe"
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with `{ token, expires_at, user }`
/// - `400 Bad Request` (validation failure or unknown role)
/// - `403 Forbidden` (registration disabled)
/// - `409 Conflict` (username or email taken)
pub async fn register(State(app_state): State<AppState>, Json(req): Json<RegisterRequest>) -> impl IntoResponse {
    let db = app_state.db();

    if let Err(validation_errors) = req.validate() {
        return response::error(StatusCode::BAD_REQUEST, format_validation_errors(&validation_errors));
    }

    let role = match req.role.as_deref().map(str::parse::<Role>) {
        None => Role::Student,
        Some(Ok(Role::Admin)) | Some(Err(_)) => {
            return response::error(StatusCode::BAD_REQUEST, "Role must be 'student' or 'teacher'");
        }
        Some(Ok(role)) => role,
    };

    match settings(db).await {
        Ok(s) if !s.allow_registration => {
            return response::error(StatusCode::FORBIDDEN, "Registration is currently disabled");
        }
        Ok(_) => {}
        Err(resp) => return resp,
    }

    match user::Model::find_by_username(db, &req.username).await {
        Ok(Some(_)) => return response::error(StatusCode::CONFLICT, "A user with this username already exists"),
        Ok(None) => {}
        Err(e) => return db_error(e),
    }
    match user::Model::find_by_email(db, &req.email).await {
        Ok(Some(_)) => return response::error(StatusCode::CONFLICT, "A user with this email already exists"),
        Ok(None) => {}
        Err(e) => return db_error(e),
    }

    let txn = match db.begin().await {
        Ok(t) => t,
        Err(e) => return db_error(e),
    };
    let (user, approval_status) = match create_account(&txn, &req, role).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            return response::error(StatusCode::CONFLICT, "A user with this username or email already exists");
        }
        Err(e) => return db_error(e),
    };
    if let Err(e) = txn.commit().await {
        return db_error(e);
    }

    tracing::info!(user_id = user.id, role = %role, "Registered new account");

    match issue_token(user, approval_status) {
        Ok(body) => response::ok(StatusCode::CREATED, body, "User registered successfully"),
        Err(resp) => resp,
    }
}

/// Inserts the account, its names and its role profile. Run inside a
/// transaction so a failed profile insert leaves no account behind.
async fn create_account<C>(
    db: &C,
    req: &RegisterRequest,
    role: Role,
) -> Result<(user::Model, Option<ApprovalStatus>), DbErr>
where
    C: ConnectionTrait,
{
    let created = user::Model::create(db, &req.username, &req.email, &req.password, role).await?;
    let user = user::Model::set_names(db, created.id, req.first_name.trim(), req.last_name.trim()).await?;

    let approval_status = match role {
        Role::Teacher => {
            let profile =
                teacher_profile::Model::create(db, user.id, req.specialization.trim(), ApprovalStatus::Pending).await?;
            Some(profile.approval_status)
        }
        _ => {
            student_profile::Model::create(db, user.id).await?;
            None
        }
    };
    Ok((user, approval_status))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// POST /api/users/login/
///
/// Authenticates by username (or email) and password. Teachers may log in
/// while their approval is pending; the status is returned alongside the
/// token.
///
/// ### Responses
/// - `200 OK` with `{ token, expires_at, user, approval_status? }`
/// - `400 Bad Request` (missing fields)
/// - `401 Unauthorized` (invalid credentials or disabled account)
pub async fn login(State(app_state): State<AppState>, Json(req): Json<LoginRequest>) -> impl IntoResponse {
    let db = app_state.db();

    if let Err(validation_errors) = req.validate() {
        return response::error(StatusCode::BAD_REQUEST, format_validation_errors(&validation_errors));
    }

    let user = match user::Model::authenticate(db, req.username.trim(), &req.password).await {
        Ok(Some(u)) => u,
        Ok(None) => return response::error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(e) => return db_error(e),
    };

    if !user.is_active {
        return response::error(StatusCode::UNAUTHORIZED, "Account is disabled");
    }

    let approval_status = match approval_of(db, &user).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match issue_token(user, approval_status) {
        Ok(body) => response::ok(StatusCode::OK, body, "Login successful"),
        Err(resp) => resp,
    }
}

#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    /// Google ID token from the client-side sign-in flow.
    pub credential: String,
}

/// Subset of the token-info endpoint payload.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    aud: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: serde_json::Value,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

impl TokenInfo {
    fn email_verified(&self) -> bool {
        match &self.email_verified {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoogleSignInResponse {
    #[serde(flatten)]
    pub auth: AuthResponse,
    pub created: bool,
}

async fn verify_google_token(credential: &str) -> Result<TokenInfo, Response> {
    let unauthorized = || response::error(StatusCode::UNAUTHORIZED, "Invalid Google credential");

    let resp = reqwest::Client::new()
        .get(config::google_tokeninfo_url())
        .query(&[("id_token", credential)])
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Google token verification request failed");
            response::error(StatusCode::BAD_GATEWAY, "Could not reach Google to verify the credential")
        })?;

    if !resp.status().is_success() {
        return Err(unauthorized());
    }
    let info: TokenInfo = resp.json().await.map_err(|_| unauthorized())?;

    let client_id = config::google_client_id();
    if !client_id.is_empty() && info.aud != client_id {
        return Err(unauthorized());
    }
    if info.email.is_none() || !info.email_verified() {
        return Err(response::error(StatusCode::UNAUTHORIZED, "Google account email is not verified"));
    }
    Ok(info)
}

/// POST /api/users/google-signin/
///
/// Verifies a Google ID token and signs in the account with that email,
/// creating a student account on first use.
///
/// ### Responses
/// - `200 OK` with `{ token, expires_at, user, created }`
/// - `400 Bad Request` (missing credential)
/// - `401 Unauthorized` (token rejected, wrong audience, unverified email, disabled account)
/// - `502 Bad Gateway` (verification endpoint unreachable)
pub async fn google_signin(
    State(app_state): State<AppState>,
    Json(req): Json<GoogleSignInRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    if req.credential.trim().is_empty() {
        return response::error(StatusCode::BAD_REQUEST, "Missing Google credential");
    }

    let info = match verify_google_token(req.credential.trim()).await {
        Ok(info) => info,
        Err(resp) => return resp,
    };
    let Some(email) = info.email.as_deref() else {
        return response::error(StatusCode::UNAUTHORIZED, "Invalid Google credential");
    };

    let (user, created) = match user::Model::find_by_email(db, email).await {
        Ok(Some(existing)) => (existing, false),
        Ok(None) => {
            let username = match user::Model::unique_username_from_email(db, email).await {
                Ok(name) => name,
                Err(e) => return db_error(e),
            };
            let user = match user::Model::create_external(
                db,
                &username,
                email,
                Role::Student,
                &info.given_name,
                &info.family_name,
            )
            .await
            {
                Ok(u) => u,
                Err(e) => return db_error(e),
            };
            if let Err(e) = student_profile::Model::create(db, user.id).await {
                return db_error(e);
            }
            tracing::info!(user_id = user.id, "Created account from Google sign-in");
            (user, true)
        }
        Err(e) => return db_error(e),
    };

    if !user.is_active {
        return response::error(StatusCode::UNAUTHORIZED, "Account is disabled");
    }

    let approval_status = match approval_of(db, &user).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match issue_token(user, approval_status) {
        Ok(auth) => (
            StatusCode::OK,
            Json(ApiResponse::success(GoogleSignInResponse { auth, created }, "Login successful")),
        )
            .into_response(),
        Err(resp) => resp,
    }
}
