use crate::{
    auth::{self, AuthenticatedUser},
    db,
    error::{ApiJson, AppError, AppResult},
    models::{LoginRequest, NewUser, TokenResponse, UpdateUserRequest, UserResponse},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Create an account
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    if db::queries::get_user_by_username(&state.db, username)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Username is already taken".to_string()));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let display_name = payload
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let user =
        db::queries::create_user(&state.db, username, &password_hash, display_name).await?;

    tracing::info!("Registered user: {} (ID: {})", user.username, user.id);

    Ok((StatusCode::CREATED, Json(user.to_response())))
}

/// Exchange username and password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = db::queries::get_user_by_username(&state.db, payload.username.trim())
        .await?
        .ok_or(AppError::InvalidLogin)?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        tracing::info!("Failed login for user: {}", user.username);
        return Err(AppError::InvalidLogin);
    }

    let token = auth::generate_token(
        &user.username,
        &state.config.security.jwt_secret,
        state.config.security.token_ttl_hours,
    )?;

    tracing::info!("User logged in: {} (ID: {})", user.username, user.id);

    Ok(Json(TokenResponse { token }))
}

/// Get current authenticated user info
pub async fn current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.user.to_response())
}

/// Edit the signed-in user's display name or password.
///
/// A blank display name falls back to the username. A new password is
/// hashed again before it is stored.
pub async fn update_current_user(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let current = &user.user;

    let display_name = match payload.display_name.as_deref().map(str::trim) {
        Some("") => None,
        Some(name) => Some(name),
        None => current.display_name.as_deref(),
    };

    let password_hash = match payload.password.as_deref() {
        Some("") => {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }
        Some(password) => auth::hash_password(password)?,
        None => current.password_hash.clone(),
    };

    let updated =
        db::queries::update_user(&state.db, current.id, display_name, &password_hash).await?;

    tracing::info!("Updated profile of user: {} (ID: {})", updated.username, updated.id);

    Ok(Json(updated.to_response()))
}
