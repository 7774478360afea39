use crate::domain::airport::Airport;
use crate::domain::pagination::{Page, PaginationMeta};
use crate::domain::route::{Route, RouteEndpoints, RoutePatch, RouteQuery, RouteRelation, RouteView};
use crate::error::{AppError, Result};
use crate::services::relations::expand_routes;
use crate::storage::DbPool;
use crate::storage::airline_repo::AirlineRepository;
use crate::storage::airport_repo::AirportRepository;
use crate::storage::route_repo::RouteRepository;
use crate::telemetry::METER_NAME;
use opentelemetry::{global, metrics::Counter};
use sqlx::PgConnection;
use uuid::Uuid;

pub const MISSING_AIRPORTS: &str = "Could not find one or both airports";

#[derive(Clone, Debug)]
struct Metrics {
    distance_computations_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter(METER_NAME);
        Self {
            distance_computations_total: meter
                .u64_counter("route_distance_computations_total")
                .with_description("Route distances computed on create or update")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RouteService {
    pool: DbPool,
    route_repo: RouteRepository,
    airport_repo: AirportRepository,
    airline_repo: AirlineRepository,
    metrics: Metrics,
}

impl RouteService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        route_repo: RouteRepository,
        airport_repo: AirportRepository,
        airline_repo: AirlineRepository,
    ) -> Self {
        Self { pool, route_repo, airport_repo, airline_repo, metrics: Metrics::new() }
    }

    /// # Errors
    /// Returns `AppError::NotFound` if either airport or the airline does not exist.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn create(&self, endpoints: RouteEndpoints) -> Result<Route> {
        let mut tx = self.pool.begin().await?;

        let distance_km = self.distance_for(&mut tx, &endpoints).await?;
        let route = self.route_repo.create(&mut tx, &endpoints, distance_km).await?;

        tx.commit().await?;

        tracing::info!(route.id = %route.id, distance_km, "Route created");
        Ok(route)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the route does not exist.
    #[tracing::instrument(skip(self), err(level = "debug"))]
    pub async fn get(&self, id: Uuid, include: &[RouteRelation]) -> Result<RouteView> {
        let mut conn = self.pool.acquire().await?;
        let route = self.route_repo.find_by_id(&mut conn, id).await?.ok_or_else(|| AppError::not_found("Route"))?;

        let mut views = expand_routes(&mut conn, &self.airport_repo, &self.airline_repo, vec![route], include).await?;
        views.pop().ok_or(AppError::Internal)
    }

    /// # Errors
    /// Returns `AppError::Database` if a query fails.
    #[tracing::instrument(skip(self, query), err)]
    pub async fn list(&self, query: &RouteQuery) -> Result<Page<RouteView>> {
        let mut conn = self.pool.acquire().await?;
        let (routes, total) = self.route_repo.list(&mut conn, query).await?;
        let data = expand_routes(&mut conn, &self.airport_repo, &self.airline_repo, routes, &query.include).await?;

        Ok(Page { data, meta: PaginationMeta::new(query.page, total) })
    }

    /// Applies the patch and recomputes the distance, even when neither endpoint changed.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the route, either airport, or the airline does not exist.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn update(&self, id: Uuid, patch: RoutePatch) -> Result<Route> {
        let mut tx = self.pool.begin().await?;

        let current =
            self.route_repo.find_for_update(&mut tx, id).await?.ok_or_else(|| AppError::not_found("Route"))?;
        let endpoints = patch.apply(&current);

        let distance_km = self.distance_for(&mut tx, &endpoints).await?;
        let route = self
            .route_repo
            .update(&mut tx, id, &endpoints, distance_km)
            .await?
            .ok_or_else(|| AppError::not_found("Route"))?;

        tx.commit().await?;

        tracing::info!(distance_km, "Route updated");
        Ok(route)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the route does not exist.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: Uuid) -> Result<Route> {
        let mut conn = self.pool.acquire().await?;
        self.route_repo.delete(&mut conn, id).await?.ok_or_else(|| AppError::not_found("Route"))
    }

    /// Validates the referenced records and returns the great-circle distance between the airports.
    async fn distance_for(&self, conn: &mut PgConnection, endpoints: &RouteEndpoints) -> Result<i32> {
        let airports = self
            .airport_repo
            .find_by_ids(conn, &[endpoints.from_airport_id, endpoints.to_airport_id])
            .await?;

        let find = |id: Uuid| airports.iter().find(|a| a.id == id);
        let (Some(from), Some(to)) = (find(endpoints.from_airport_id), find(endpoints.to_airport_id)) else {
            return Err(AppError::NotFound(MISSING_AIRPORTS.to_string()));
        };

        if self.airline_repo.find_by_id(conn, endpoints.airline_id).await?.is_none() {
            return Err(AppError::not_found("Airline"));
        }

        Ok(self.measure(from, to))
    }

    fn measure(&self, from: &Airport, to: &Airport) -> i32 {
        self.metrics.distance_computations_total.add(1, &[]);
        from.location.distance_km(&to.location)
    }
}
