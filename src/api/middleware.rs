use crate::api::AppState;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, Request, header, request::Parts},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// The caller identified by a valid bearer access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts.headers.get(header::AUTHORIZATION).ok_or(AppError::AuthError)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::AuthError)?;
        let token = auth_str.strip_prefix("Bearer ").ok_or(AppError::AuthError)?;

        let claims = state.auth_service.verify_token(token)?;

        tracing::Span::current().record("user_id", tracing::field::display(claims.sub));

        Ok(Self { user_id: claims.sub, email: claims.email })
    }
}

/// Issues a v4 UUID for requests that arrive without an `x-request-id`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string()).ok().map(RequestId::new)
    }
}
