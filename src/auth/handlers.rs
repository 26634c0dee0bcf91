use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse, UserResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        services::{self, is_valid_email},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(me))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = payload.email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let user = services::login(state.users.as_ref(), email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.email)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn me(CurrentUser(principal): CurrentUser) -> Json<UserResponse> {
    Json(principal.into())
}
