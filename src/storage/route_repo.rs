use crate::domain::route::{Route, RouteEndpoints, RouteFilter, RouteQuery};
use crate::error::Result;
use crate::storage::contains_pattern;
use crate::storage::records::RouteRecord;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, from_airport_id, to_airport_id, airline_id, distance_km, created_at, updated_at";
const QUALIFIED_COLUMNS: &str =
    "r.id, r.from_airport_id, r.to_airport_id, r.airline_id, r.distance_km, r.created_at, r.updated_at";

/// Which foreign key a batched lookup matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteLink {
    FromAirport,
    ToAirport,
    Airline,
}

impl RouteLink {
    const fn column(self) -> &'static str {
        match self {
            Self::FromAirport => "from_airport_id",
            Self::ToAirport => "to_airport_id",
            Self::Airline => "airline_id",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RouteRepository {}

impl RouteRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        endpoints: &RouteEndpoints,
        distance_km: i32,
    ) -> Result<Route> {
        let record = sqlx::query_as::<_, RouteRecord>(&format!(
            r"
            INSERT INTO routes (id, from_airport_id, to_airport_id, airline_id, distance_km)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(endpoints.from_airport_id)
        .bind(endpoints.to_airport_id)
        .bind(endpoints.airline_id)
        .bind(distance_km)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Route>> {
        let record = sqlx::query_as::<_, RouteRecord>(&format!("SELECT {COLUMNS} FROM routes WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// Locks the row for the rest of the transaction so concurrent updates cannot interleave
    /// between reading the stored endpoints and writing the recomputed distance.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_for_update(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Route>> {
        let record =
            sqlx::query_as::<_, RouteRecord>(&format!("SELECT {COLUMNS} FROM routes WHERE id = $1 FOR UPDATE"))
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(record.map(Into::into))
    }

    /// All routes whose `link` column matches one of `ids`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, ids), err)]
    pub(crate) async fn find_linked(&self, conn: &mut PgConnection, link: RouteLink, ids: &[Uuid]) -> Result<Vec<Route>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = sqlx::query_as::<_, RouteRecord>(&format!(
            "SELECT {COLUMNS} FROM routes WHERE {} = ANY($1) ORDER BY created_at ASC, id ASC",
            link.column()
        ))
        .bind(ids)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        endpoints: &RouteEndpoints,
        distance_km: i32,
    ) -> Result<Option<Route>> {
        let record = sqlx::query_as::<_, RouteRecord>(&format!(
            r"
            UPDATE routes
            SET from_airport_id = $2, to_airport_id = $3, airline_id = $4, distance_km = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(endpoints.from_airport_id)
        .bind(endpoints.to_airport_id)
        .bind(endpoints.airline_id)
        .bind(distance_km)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Route>> {
        let record = sqlx::query_as::<_, RouteRecord>(&format!("DELETE FROM routes WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if either query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, query), err)]
    pub(crate) async fn list(&self, conn: &mut PgConnection, query: &RouteQuery) -> Result<(Vec<Route>, i64)> {
        let total = filtered("SELECT COUNT(*)", &query.filter).build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

        let mut builder = filtered(&format!("SELECT {QUALIFIED_COLUMNS}"), &query.filter);
        builder
            .push(format_args!(" ORDER BY r.{} {}, r.id ASC", query.sort_by.column(), query.sort_order.as_sql()))
            .push(" LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let records = builder.build_query_as::<RouteRecord>().fetch_all(&mut *conn).await?;

        Ok((records.into_iter().map(Into::into).collect(), total))
    }
}

fn filtered(select: &str, filter: &RouteFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(select);
    builder.push(
        r"
        FROM routes r
        JOIN airports fa ON fa.id = r.from_airport_id
        JOIN airports ta ON ta.id = r.to_airport_id
        JOIN airlines al ON al.id = r.airline_id
        WHERE TRUE",
    );

    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        builder
            .push(" AND (fa.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR ta.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR al.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(from_airport_id) = filter.from_airport_id {
        builder.push(" AND r.from_airport_id = ").push_bind(from_airport_id);
    }

    if let Some(to_airport_id) = filter.to_airport_id {
        builder.push(" AND r.to_airport_id = ").push_bind(to_airport_id);
    }

    if !filter.airline_ids.is_empty() {
        builder.push(" AND r.airline_id = ANY(").push_bind(filter.airline_ids.clone()).push(")");
    }

    builder
}
