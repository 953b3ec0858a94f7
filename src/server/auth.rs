//! Token authentication extractor
//!
//! Clients present `Authorization: Token <key>` (the Bearer scheme is also
//! accepted). The token resolves to a user through the auth_tokens table;
//! anything else is a 401.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::Error;

use super::state::AppState;

/// The authenticated caller, extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID
    pub id: Uuid,
    /// Username
    pub username: String,
}

/// Pull the token out of an Authorization header value
fn parse_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    match scheme {
        "Token" | "Bearer" => Some(token),
        _ => None,
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;

        let token = parse_token(header)
            .ok_or_else(|| Error::Unauthorized("Malformed Authorization header".to_string()))?;

        let user = state
            .db()
            .get_user_by_token(token)?
            .ok_or_else(|| Error::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}
