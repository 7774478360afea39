use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::routes::{CreateRoute, RouteListParams, RouteResponse, UpdateRoute};
use crate::api::schemas::{IncludeParams, Paginated};
use crate::domain::route::RouteQuery;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn list_routes(
    State(state): State<AppState>,
    Query(params): Query<RouteListParams>,
) -> Result<impl IntoResponse> {
    let query = RouteQuery::try_from(params).map_err(AppError::BadRequest)?;
    let page = state.route_service.list(&query).await?;

    Ok(Json(Paginated {
        data: page.data.into_iter().map(RouteResponse::from).collect(),
        meta: page.meta.into(),
    }))
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<IncludeParams>,
) -> Result<impl IntoResponse> {
    let include = params.relations().map_err(AppError::BadRequest)?;
    let view = state.route_service.get(id, &include).await?;
    Ok(Json(RouteResponse::from(view)))
}

/// Creates a route; the distance is computed from the airports' coordinates.
///
/// # Errors
/// Returns `AppError::NotFound` if either airport or the airline does not exist.
pub async fn create_route(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRoute>,
) -> Result<impl IntoResponse> {
    let route = state.route_service.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(RouteResponse::from(route))))
}

pub async fn update_route(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoute>,
) -> Result<impl IntoResponse> {
    let route = state.route_service.update(id, payload.into()).await?;
    Ok(Json(RouteResponse::from(route)))
}

pub async fn delete_route(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let route = state.route_service.delete(id).await?;
    Ok(Json(RouteResponse::from(route)))
}
