use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::auth::{Credentials, Profile, RefreshRequest, TokenPair};
use crate::error::Result;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn register(State(state): State<AppState>, Json(payload): Json<Credentials>) -> Result<impl IntoResponse> {
    let session = state.account_service.register(payload.email, payload.password).await?;
    Ok((StatusCode::CREATED, Json(TokenPair::from(session))))
}

pub async fn login(State(state): State<AppState>, Json(payload): Json<Credentials>) -> Result<impl IntoResponse> {
    let session = state.account_service.login(payload.email, payload.password).await?;
    Ok(Json(TokenPair::from(session)))
}

/// Rotates the presented refresh token. The old token is rejected from then on.
pub async fn refresh(State(state): State<AppState>, Json(payload): Json<RefreshRequest>) -> Result<impl IntoResponse> {
    let session = state.account_service.refresh(payload.refresh_token).await?;
    Ok(Json(TokenPair::from(session)))
}

pub async fn logout(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    state.account_service.logout(auth_user.user_id).await?;
    Ok(Json(true))
}

pub async fn profile(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let user = state.account_service.profile(auth_user.user_id).await?;
    Ok(Json(Profile::from(user)))
}
