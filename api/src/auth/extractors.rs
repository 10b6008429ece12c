use crate::auth::claims::{AuthUser, Claims};
use crate::response::{ApiResponse, Empty};
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use util::config;

/// Pulls the raw token out of an `Authorization` header value. Both the
/// `Token <t>` and `Bearer <t>` schemes are accepted.
pub fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")).then_some(token)
}

pub fn decode_token(token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config::jwt_secret().as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()
    .map(|data| data.claims)
}

/// Extracts an `AuthUser` from the `Authorization` header.
///
/// # Errors
/// `401 Unauthorized` if the header is missing, malformed, or the token is
/// invalid or expired.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiResponse<Empty>>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_header)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Missing or invalid Authorization header")),
            ))?;

        let claims = decode_token(header).ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid or expired token")),
        ))?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::token_from_header;

    #[test]
    fn accepts_token_and_bearer_schemes() {
        assert_eq!(token_from_header("Token abc.def"), Some("abc.def"));
        assert_eq!(token_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(token_from_header("bearer  xyz"), Some("xyz"));
        assert_eq!(token_from_header("Basic abc"), None);
        assert_eq!(token_from_header("Token "), None);
        assert_eq!(token_from_header("abc"), None);
    }
}
