use crate::domain::airport::{Airport, AirportPatch, AirportQuery, AirportRelation, AirportView, NewAirport};
use crate::domain::pagination::{Page, PaginationMeta};
use crate::domain::route::{RouteEndpoints, RouteRelation};
use crate::error::{AppError, Result};
use crate::services::relations::{expand_routes, group_by_owner};
use crate::storage::DbPool;
use crate::storage::airline_repo::AirlineRepository;
use crate::storage::airport_repo::AirportRepository;
use crate::storage::route_repo::{RouteLink, RouteRepository};
use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct AirportService {
    pool: DbPool,
    airport_repo: AirportRepository,
    route_repo: RouteRepository,
    airline_repo: AirlineRepository,
}

impl AirportService {
    #[must_use]
    pub const fn new(
        pool: DbPool,
        airport_repo: AirportRepository,
        route_repo: RouteRepository,
        airline_repo: AirlineRepository,
    ) -> Self {
        Self { pool, airport_repo, route_repo, airline_repo }
    }

    /// # Errors
    /// Returns `AppError::Database` (409 on response) when the code is already taken.
    #[tracing::instrument(skip(self, airport), fields(code = %airport.code), err(level = "warn"))]
    pub async fn create(&self, airport: NewAirport) -> Result<Airport> {
        let mut conn = self.pool.acquire().await?;
        let airport = self.airport_repo.create(&mut conn, &airport).await?;
        tracing::info!(airport.id = %airport.id, "Airport created");
        Ok(airport)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the airport does not exist.
    #[tracing::instrument(skip(self), err(level = "debug"))]
    pub async fn get(&self, id: Uuid, include: &[AirportRelation]) -> Result<AirportView> {
        let mut conn = self.pool.acquire().await?;
        let airport =
            self.airport_repo.find_by_id(&mut conn, id).await?.ok_or_else(|| AppError::not_found("Airport"))?;

        let mut views = self.expand(&mut conn, vec![airport], include).await?;
        views.pop().ok_or(AppError::Internal)
    }

    /// # Errors
    /// Returns `AppError::Database` if a query fails.
    #[tracing::instrument(skip(self, query), err)]
    pub async fn list(&self, query: &AirportQuery) -> Result<Page<AirportView>> {
        let mut conn = self.pool.acquire().await?;
        let (airports, total) = self.airport_repo.list(&mut conn, query).await?;
        let data = self.expand(&mut conn, airports, &query.include).await?;

        Ok(Page { data, meta: PaginationMeta::new(query.page, total) })
    }

    /// Applies a partial update. Moving an airport recomputes the distance of every route touching it.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the airport does not exist and `AppError::BadRequest`
    /// if the merged coordinates are invalid.
    #[tracing::instrument(skip(self, patch), err(level = "warn"))]
    pub async fn update(&self, id: Uuid, patch: AirportPatch) -> Result<Airport> {
        let mut tx = self.pool.begin().await?;

        let current =
            self.airport_repo.find_by_id(&mut tx, id).await?.ok_or_else(|| AppError::not_found("Airport"))?;
        let merged = patch.apply(&current).map_err(AppError::BadRequest)?;
        let moved = merged.location != current.location;

        let airport =
            self.airport_repo.update(&mut tx, id, &merged).await?.ok_or_else(|| AppError::not_found("Airport"))?;

        if moved {
            self.remeasure_routes(&mut tx, &airport).await?;
        }

        tx.commit().await?;

        tracing::info!(moved, "Airport updated");
        Ok(airport)
    }

    /// Deletes the airport together with its routes and airline links.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the airport does not exist.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: Uuid) -> Result<Airport> {
        let mut conn = self.pool.acquire().await?;
        self.airport_repo.delete(&mut conn, id).await?.ok_or_else(|| AppError::not_found("Airport"))
    }

    async fn remeasure_routes(&self, conn: &mut PgConnection, moved: &Airport) -> Result<()> {
        let mut routes = self.route_repo.find_linked(conn, RouteLink::FromAirport, &[moved.id]).await?;
        routes.extend(self.route_repo.find_linked(conn, RouteLink::ToAirport, &[moved.id]).await?);
        routes.sort_unstable_by_key(|r| r.id);
        routes.dedup_by_key(|r| r.id);

        let mut other_ids: Vec<Uuid> = routes.iter().flat_map(|r| [r.from_airport_id, r.to_airport_id]).collect();
        other_ids.sort_unstable();
        other_ids.dedup();

        let airports: HashMap<Uuid, Airport> =
            self.airport_repo.find_by_ids(conn, &other_ids).await?.into_iter().map(|a| (a.id, a)).collect();

        for route in &routes {
            let (Some(from), Some(to)) = (airports.get(&route.from_airport_id), airports.get(&route.to_airport_id))
            else {
                continue;
            };
            let endpoints = RouteEndpoints {
                from_airport_id: route.from_airport_id,
                to_airport_id: route.to_airport_id,
                airline_id: route.airline_id,
            };
            self.route_repo.update(conn, route.id, &endpoints, from.location.distance_km(&to.location)).await?;
        }

        tracing::debug!(count = routes.len(), "Recomputed route distances");
        Ok(())
    }

    async fn expand(
        &self,
        conn: &mut PgConnection,
        airports: Vec<Airport>,
        include: &[AirportRelation],
    ) -> Result<Vec<AirportView>> {
        let ids: Vec<Uuid> = airports.iter().map(|a| a.id).collect();

        let mut airlines = if include.contains(&AirportRelation::ServicedByAirlines) {
            Some(group_by_owner(self.airline_repo.find_servicing(conn, &ids).await?))
        } else {
            None
        };

        let mut routes_from = if include.contains(&AirportRelation::RoutesFrom) {
            let routes = self.route_repo.find_linked(conn, RouteLink::FromAirport, &ids).await?;
            let views = expand_routes(conn, &self.airport_repo, &self.airline_repo, routes, &RouteRelation::ALL).await?;
            Some(group_by_owner(views.into_iter().map(|v| (v.route.from_airport_id, v)).collect()))
        } else {
            None
        };

        let mut routes_to = if include.contains(&AirportRelation::RoutesTo) {
            let routes = self.route_repo.find_linked(conn, RouteLink::ToAirport, &ids).await?;
            let views = expand_routes(conn, &self.airport_repo, &self.airline_repo, routes, &RouteRelation::ALL).await?;
            Some(group_by_owner(views.into_iter().map(|v| (v.route.to_airport_id, v)).collect()))
        } else {
            None
        };

        Ok(airports
            .into_iter()
            .map(|airport| {
                let id = airport.id;
                AirportView {
                    serviced_by_airlines: airlines.as_mut().map(|m| m.remove(&id).unwrap_or_default()),
                    routes_from: routes_from.as_mut().map(|m| m.remove(&id).unwrap_or_default()),
                    routes_to: routes_to.as_mut().map(|m| m.remove(&id).unwrap_or_default()),
                    airport,
                }
            })
            .collect())
    }
}
