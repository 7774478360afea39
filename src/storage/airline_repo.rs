use crate::domain::airline::{Airline, AirlineFilter, AirlineQuery};
use crate::error::Result;
use crate::storage::contains_pattern;
use crate::storage::records::{AirlineRecord, LinkedAirlineRecord};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, name, base_country, created_at, updated_at";

#[derive(Clone, Debug, Default)]
pub struct AirlineRepository {}

impl AirlineRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, name, base_country), err)]
    pub(crate) async fn create(&self, conn: &mut PgConnection, name: &str, base_country: &str) -> Result<Airline> {
        let record = sqlx::query_as::<_, AirlineRecord>(&format!(
            "INSERT INTO airlines (id, name, base_country) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(base_country)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// Replaces the set of airports the airline services.
    ///
    /// # Errors
    /// Returns `AppError::Database` if either statement fails.
    #[tracing::instrument(level = "debug", skip(self, conn, airport_ids), fields(count = airport_ids.len()), err)]
    pub(crate) async fn set_serviced_airports(
        &self,
        conn: &mut PgConnection,
        airline_id: Uuid,
        airport_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM airline_airports WHERE airline_id = $1").bind(airline_id).execute(&mut *conn).await?;

        sqlx::query(
            r"
            INSERT INTO airline_airports (airline_id, airport_id)
            SELECT $1, airport_id FROM UNNEST($2::uuid[]) AS t(airport_id)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(airline_id)
        .bind(airport_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Airline>> {
        let record = sqlx::query_as::<_, AirlineRecord>(&format!("SELECT {COLUMNS} FROM airlines WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, ids), fields(count = ids.len()), err)]
    pub(crate) async fn find_by_ids(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Airline>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records =
            sqlx::query_as::<_, AirlineRecord>(&format!("SELECT {COLUMNS} FROM airlines WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(conn)
                .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Airlines servicing each of `airport_ids`, tagged with the airport id.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, airport_ids), err)]
    pub(crate) async fn find_servicing(
        &self,
        conn: &mut PgConnection,
        airport_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Airline)>> {
        if airport_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = sqlx::query_as::<_, LinkedAirlineRecord>(
            r"
            SELECT aa.airport_id AS owner_id, al.id, al.name, al.base_country, al.created_at, al.updated_at
            FROM airline_airports aa
            JOIN airlines al ON al.id = aa.airline_id
            WHERE aa.airport_id = ANY($1)
            ORDER BY al.name ASC
            ",
        )
        .bind(airport_ids)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(|r| (r.owner_id, r.airline.into())).collect())
    }

    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, name, base_country), err)]
    pub(crate) async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        name: &str,
        base_country: &str,
    ) -> Result<Option<Airline>> {
        let record = sqlx::query_as::<_, AirlineRecord>(&format!(
            "UPDATE airlines SET name = $2, base_country = $3, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(base_country)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Airline>> {
        let record = sqlx::query_as::<_, AirlineRecord>(&format!("DELETE FROM airlines WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if either query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, query), err)]
    pub(crate) async fn list(&self, conn: &mut PgConnection, query: &AirlineQuery) -> Result<(Vec<Airline>, i64)> {
        let total = filtered("SELECT COUNT(*) FROM airlines", &query.filter)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut builder = filtered(&format!("SELECT {COLUMNS} FROM airlines"), &query.filter);
        builder
            .push(format_args!(" ORDER BY {} {}, id ASC", query.sort_by.column(), query.sort_order.as_sql()))
            .push(" LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let records = builder.build_query_as::<AirlineRecord>().fetch_all(&mut *conn).await?;

        Ok((records.into_iter().map(Into::into).collect(), total))
    }
}

fn filtered(select: &str, filter: &AirlineFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        builder.push(" AND (name ILIKE ").push_bind(pattern.clone()).push(" OR base_country ILIKE ").push_bind(pattern).push(")");
    }

    if !filter.base_countries.is_empty() {
        let lowered: Vec<String> = filter.base_countries.iter().map(|c| c.to_lowercase()).collect();
        builder.push(" AND LOWER(base_country) = ANY(").push_bind(lowered).push(")");
    }

    builder
}
