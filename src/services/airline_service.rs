use crate::domain::airline::{Airline, AirlinePatch, AirlineQuery, AirlineRelation, AirlineView, NewAirline};
use crate::domain::pagination::{Page, PaginationMeta};
use crate::domain::route::RouteRelation;
use crate::error::{AppError, Result};
use crate::services::relations::{expand_routes, group_by_owner};
use crate::storage::DbPool;
use crate::storage::airline_repo::AirlineRepository;
use crate::storage::airport_repo::AirportRepository;
use crate::storage::route_repo::{RouteLink, RouteRepository};
use sqlx::PgConnection;
use uuid::Uuid;

const OPERATED_ROUTE_RELATIONS: [RouteRelation; 2] = [RouteRelation::FromAirport, RouteRelation::ToAirport];

#[derive(Clone, Debug)]
pub struct AirlineService {
    pool: DbPool,
    airline_repo: AirlineRepository,
    airport_repo: AirportRepository,
    route_repo: RouteRepository,
}

impl AirlineService {
    #[must_use]
    pub const fn new(
        pool: DbPool,
        airline_repo: AirlineRepository,
        airport_repo: AirportRepository,
        route_repo: RouteRepository,
    ) -> Self {
        Self { pool, airline_repo, airport_repo, route_repo }
    }

    /// # Errors
    /// Returns `AppError::BadRequest` when no serviced airports are given and
    /// `AppError::NotFound` when one of them does not exist.
    #[tracing::instrument(skip(self, airline), fields(airports = airline.serviced_airport_ids.len()), err(level = "warn"))]
    pub async fn create(&self, airline: NewAirline) -> Result<Airline> {
        let serviced = dedup(airline.serviced_airport_ids);
        if serviced.is_empty() {
            return Err(AppError::BadRequest("At least one serviced airport is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        self.ensure_airports_exist(&mut tx, &serviced).await?;
        let created = self.airline_repo.create(&mut tx, &airline.name, &airline.base_country).await?;
        self.airline_repo.set_serviced_airports(&mut tx, created.id, &serviced).await?;

        tx.commit().await?;

        tracing::info!(airline.id = %created.id, "Airline created");
        Ok(created)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the airline does not exist.
    #[tracing::instrument(skip(self), err(level = "debug"))]
    pub async fn get(&self, id: Uuid, include: &[AirlineRelation]) -> Result<AirlineView> {
        let mut conn = self.pool.acquire().await?;
        let airline =
            self.airline_repo.find_by_id(&mut conn, id).await?.ok_or_else(|| AppError::not_found("Airline"))?;

        let mut views = self.expand(&mut conn, vec![airline], include).await?;
        views.pop().ok_or(AppError::Internal)
    }

    /// # Errors
    /// Returns `AppError::Database` if a query fails.
    #[tracing::instrument(skip(self, query), err)]
    pub async fn list(&self, query: &AirlineQuery) -> Result<Page<AirlineView>> {
        let mut conn = self.pool.acquire().await?;
        let (airlines, total) = self.airline_repo.list(&mut conn, query).await?;
        let data = self.expand(&mut conn, airlines, &query.include).await?;

        Ok(Page { data, meta: PaginationMeta::new(query.page, total) })
    }

    /// Applies a partial update. A present serviced-airport list replaces the current set.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the airline or a serviced airport does not exist.
    #[tracing::instrument(skip(self, patch), err(level = "warn"))]
    pub async fn update(&self, id: Uuid, patch: AirlinePatch) -> Result<Airline> {
        let mut tx = self.pool.begin().await?;

        let current =
            self.airline_repo.find_by_id(&mut tx, id).await?.ok_or_else(|| AppError::not_found("Airline"))?;

        let name = patch.name.unwrap_or(current.name);
        let base_country = patch.base_country.unwrap_or(current.base_country);
        let updated = self
            .airline_repo
            .update(&mut tx, id, &name, &base_country)
            .await?
            .ok_or_else(|| AppError::not_found("Airline"))?;

        if let Some(ids) = patch.serviced_airport_ids {
            let serviced = dedup(ids);
            self.ensure_airports_exist(&mut tx, &serviced).await?;
            self.airline_repo.set_serviced_airports(&mut tx, id, &serviced).await?;
        }

        tx.commit().await?;

        tracing::info!("Airline updated");
        Ok(updated)
    }

    /// Deletes the airline together with its routes.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the airline does not exist.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: Uuid) -> Result<Airline> {
        let mut conn = self.pool.acquire().await?;
        self.airline_repo.delete(&mut conn, id).await?.ok_or_else(|| AppError::not_found("Airline"))
    }

    async fn ensure_airports_exist(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.airport_repo.count_existing(conn, ids).await?;
        if usize::try_from(found).map_or(true, |found| found != ids.len()) {
            return Err(AppError::NotFound("One or more serviced airports not found".to_string()));
        }
        Ok(())
    }

    async fn expand(
        &self,
        conn: &mut PgConnection,
        airlines: Vec<Airline>,
        include: &[AirlineRelation],
    ) -> Result<Vec<AirlineView>> {
        let ids: Vec<Uuid> = airlines.iter().map(|a| a.id).collect();

        let mut airports = if include.contains(&AirlineRelation::ServicedAirports) {
            Some(group_by_owner(self.airport_repo.find_serviced_by(conn, &ids).await?))
        } else {
            None
        };

        let mut routes = if include.contains(&AirlineRelation::OperatedRoutes) {
            let routes = self.route_repo.find_linked(conn, RouteLink::Airline, &ids).await?;
            let views =
                expand_routes(conn, &self.airport_repo, &self.airline_repo, routes, &OPERATED_ROUTE_RELATIONS).await?;
            Some(group_by_owner(views.into_iter().map(|v| (v.route.airline_id, v)).collect()))
        } else {
            None
        };

        Ok(airlines
            .into_iter()
            .map(|airline| {
                let id = airline.id;
                AirlineView {
                    serviced_airports: airports.as_mut().map(|m| m.remove(&id).unwrap_or_default()),
                    operated_routes: routes.as_mut().map(|m| m.remove(&id).unwrap_or_default()),
                    airline,
                }
            })
            .collect())
    }
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
