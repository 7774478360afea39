use crate::domain::airport::{Airport, AirportFilter, AirportQuery, NewAirport};
use crate::error::Result;
use crate::storage::contains_pattern;
use crate::storage::records::{AirportRecord, LinkedAirportRecord};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, name, code, country, latitude, longitude, created_at, updated_at";

#[derive(Clone, Debug, Default)]
pub struct AirportRepository {}

impl AirportRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Database` on failure, including a unique violation for a duplicate code.
    #[tracing::instrument(level = "debug", skip(self, conn, airport), fields(code = %airport.code), err)]
    pub(crate) async fn create(&self, conn: &mut PgConnection, airport: &NewAirport) -> Result<Airport> {
        let record = sqlx::query_as::<_, AirportRecord>(&format!(
            r"
            INSERT INTO airports (id, name, code, country, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(&airport.name)
        .bind(&airport.code)
        .bind(&airport.country)
        .bind(airport.location.latitude())
        .bind(airport.location.longitude())
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Airport>> {
        let record = sqlx::query_as::<_, AirportRecord>(&format!("SELECT {COLUMNS} FROM airports WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, ids), fields(count = ids.len()), err)]
    pub(crate) async fn find_by_ids(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Airport>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records =
            sqlx::query_as::<_, AirportRecord>(&format!("SELECT {COLUMNS} FROM airports WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(conn)
                .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Number of distinct ids in `ids` that refer to an existing airport.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, ids), err)]
    pub(crate) async fn count_existing(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM airports WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(conn)
            .await?;
        Ok(count)
    }

    /// Airports serviced by each of `airline_ids`, tagged with the airline id.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, airline_ids), err)]
    pub(crate) async fn find_serviced_by(
        &self,
        conn: &mut PgConnection,
        airline_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Airport)>> {
        if airline_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = sqlx::query_as::<_, LinkedAirportRecord>(
            r"
            SELECT aa.airline_id AS owner_id, a.id, a.name, a.code, a.country, a.latitude, a.longitude,
                   a.created_at, a.updated_at
            FROM airline_airports aa
            JOIN airports a ON a.id = aa.airport_id
            WHERE aa.airline_id = ANY($1)
            ORDER BY a.name ASC
            ",
        )
        .bind(airline_ids)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(|r| (r.owner_id, r.airport.into())).collect())
    }

    /// Overwrites every mutable column and bumps `updated_at`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, airport), err)]
    pub(crate) async fn update(&self, conn: &mut PgConnection, id: Uuid, airport: &NewAirport) -> Result<Option<Airport>> {
        let record = sqlx::query_as::<_, AirportRecord>(&format!(
            r"
            UPDATE airports
            SET name = $2, code = $3, country = $4, latitude = $5, longitude = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&airport.name)
        .bind(&airport.code)
        .bind(&airport.country)
        .bind(airport.location.latitude())
        .bind(airport.location.longitude())
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Deletes the airport along with its routes and airline links.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Airport>> {
        let record = sqlx::query_as::<_, AirportRecord>(&format!("DELETE FROM airports WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// Returns one page of airports and the total number of matches.
    ///
    /// # Errors
    /// Returns `AppError::Database` if either query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, query), err)]
    pub(crate) async fn list(&self, conn: &mut PgConnection, query: &AirportQuery) -> Result<(Vec<Airport>, i64)> {
        let total = filtered("SELECT COUNT(*) FROM airports", &query.filter)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut builder = filtered(&format!("SELECT {COLUMNS} FROM airports"), &query.filter);
        builder
            .push(format_args!(" ORDER BY {} {}, id ASC", query.sort_by.column(), query.sort_order.as_sql()))
            .push(" LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let records = builder.build_query_as::<AirportRecord>().fetch_all(&mut *conn).await?;

        Ok((records.into_iter().map(Into::into).collect(), total))
    }
}

fn filtered(select: &str, filter: &AirportFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR country ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if !filter.countries.is_empty() {
        builder.push(" AND country = ANY(").push_bind(filter.countries.clone()).push(")");
    }

    if let Some(code) = &filter.code {
        builder.push(" AND code ILIKE ").push_bind(contains_pattern(code));
    }

    builder
}
