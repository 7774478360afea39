use crate::domain::airline::Airline;
use crate::domain::airport::Airport;
use crate::domain::geo::GeoPoint;
use crate::domain::route::Route;
use crate::domain::user::User;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AirportRecord {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<AirportRecord> for Airport {
    fn from(record: AirportRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            code: record.code,
            country: record.country,
            location: GeoPoint::from_stored(record.latitude, record.longitude),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// An airport row tagged with the id of the entity it was joined through.
#[derive(sqlx::FromRow)]
pub(crate) struct LinkedAirportRecord {
    pub owner_id: Uuid,
    #[sqlx(flatten)]
    pub airport: AirportRecord,
}

#[derive(sqlx::FromRow)]
pub(crate) struct AirlineRecord {
    pub id: Uuid,
    pub name: String,
    pub base_country: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<AirlineRecord> for Airline {
    fn from(record: AirlineRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            base_country: record.base_country,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct LinkedAirlineRecord {
    pub owner_id: Uuid,
    #[sqlx(flatten)]
    pub airline: AirlineRecord,
}

#[derive(sqlx::FromRow)]
pub(crate) struct RouteRecord {
    pub id: Uuid,
    pub from_airport_id: Uuid,
    pub to_airport_id: Uuid,
    pub airline_id: Uuid,
    pub distance_km: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<RouteRecord> for Route {
    fn from(record: RouteRecord) -> Self {
        Self {
            id: record.id,
            from_airport_id: record.from_airport_id,
            to_airport_id: record.to_airport_id,
            airline_id: record.airline_id,
            distance_km: record.distance_km,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
