use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::airports::{AirportListParams, AirportResponse, CreateAirport, UpdateAirport};
use crate::api::schemas::{IncludeParams, Paginated};
use crate::domain::airport::AirportQuery;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Lists airports with pagination, filtering and optional relations.
///
/// # Errors
/// Returns `AppError::BadRequest` for malformed query parameters.
pub async fn list_airports(
    State(state): State<AppState>,
    Query(params): Query<AirportListParams>,
) -> Result<impl IntoResponse> {
    let query = AirportQuery::try_from(params).map_err(AppError::BadRequest)?;
    let page = state.airport_service.list(&query).await?;

    Ok(Json(Paginated {
        data: page.data.into_iter().map(AirportResponse::from).collect(),
        meta: page.meta.into(),
    }))
}

pub async fn get_airport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<IncludeParams>,
) -> Result<impl IntoResponse> {
    let include = params.relations().map_err(AppError::BadRequest)?;
    let view = state.airport_service.get(id, &include).await?;
    Ok(Json(AirportResponse::from(view)))
}

/// # Errors
/// Returns `AppError::BadRequest` for invalid fields and a conflict when the code is taken.
pub async fn create_airport(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAirport>,
) -> Result<impl IntoResponse> {
    let airport = state.airport_service.create(payload.try_into().map_err(AppError::BadRequest)?).await?;
    Ok((StatusCode::CREATED, Json(AirportResponse::from(airport))))
}

pub async fn update_airport(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAirport>,
) -> Result<impl IntoResponse> {
    let airport = state.airport_service.update(id, payload.try_into().map_err(AppError::BadRequest)?).await?;
    Ok(Json(AirportResponse::from(airport)))
}

pub async fn delete_airport(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let airport = state.airport_service.delete(id).await?;
    Ok(Json(AirportResponse::from(airport)))
}
