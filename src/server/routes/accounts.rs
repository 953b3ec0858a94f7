//! Registration and login endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{generate_token, hash_password, verify_password};
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{CredentialsRequest, TokenResponse};

/// POST /api/register - Create an account and issue a token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(Error::validation("Username and password required"));
    }

    let user = state.db().create_user(username, &hash_password(&request.password))?;

    let token = generate_token();
    state.db().insert_token(&token, &user.id)?;

    tracing::info!("Registered user '{}'", user.username);

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// POST /api/login - Verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .db()
        .get_user_by_username(request.username.trim())?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(Error::InvalidCredentials);
    }

    let token = generate_token();
    state.db().insert_token(&token, &user.id)?;

    tracing::info!("User '{}' logged in", user.username);

    Ok(Json(TokenResponse { token }))
}
