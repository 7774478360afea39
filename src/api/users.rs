use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::auth::{Profile, UpdateProfile};
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};

pub async fn update_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfile>,
) -> Result<impl IntoResponse> {
    let user = state.account_service.update_profile(auth_user.user_id, payload.email).await?;
    Ok(Json(Profile::from(user)))
}
