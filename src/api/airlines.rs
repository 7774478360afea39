use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::airlines::{AirlineListParams, AirlineResponse, CreateAirline, UpdateAirline};
use crate::api::schemas::{IncludeParams, Paginated};
use crate::domain::airline::AirlineQuery;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn list_airlines(
    State(state): State<AppState>,
    Query(params): Query<AirlineListParams>,
) -> Result<impl IntoResponse> {
    let query = AirlineQuery::try_from(params).map_err(AppError::BadRequest)?;
    let page = state.airline_service.list(&query).await?;

    Ok(Json(Paginated {
        data: page.data.into_iter().map(AirlineResponse::from).collect(),
        meta: page.meta.into(),
    }))
}

pub async fn get_airline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<IncludeParams>,
) -> Result<impl IntoResponse> {
    let include = params.relations().map_err(AppError::BadRequest)?;
    let view = state.airline_service.get(id, &include).await?;
    Ok(Json(AirlineResponse::from(view)))
}

/// # Errors
/// Returns `AppError::NotFound` when a serviced airport does not exist.
pub async fn create_airline(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAirline>,
) -> Result<impl IntoResponse> {
    let airline = state.airline_service.create(payload.try_into().map_err(AppError::BadRequest)?).await?;
    Ok((StatusCode::CREATED, Json(AirlineResponse::from(airline))))
}

pub async fn update_airline(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAirline>,
) -> Result<impl IntoResponse> {
    let airline = state.airline_service.update(id, payload.try_into().map_err(AppError::BadRequest)?).await?;
    Ok(Json(AirlineResponse::from(airline)))
}

pub async fn delete_airline(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let airline = state.airline_service.delete(id).await?;
    Ok(Json(AirlineResponse::from(airline)))
}
