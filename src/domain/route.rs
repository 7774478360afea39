use crate::domain::airline::Airline;
use crate::domain::airport::Airport;
use crate::domain::pagination::{PageRequest, SortOrder};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: Uuid,
    pub from_airport_id: Uuid,
    pub to_airport_id: Uuid,
    pub airline_id: Uuid,
    pub distance_km: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Route endpoints and operator. Distance is never part of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEndpoints {
    pub from_airport_id: Uuid,
    pub to_airport_id: Uuid,
    pub airline_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutePatch {
    pub from_airport_id: Option<Uuid>,
    pub to_airport_id: Option<Uuid>,
    pub airline_id: Option<Uuid>,
}

impl RoutePatch {
    /// Missing fields fall back to the stored route.
    #[must_use]
    pub fn apply(self, current: &Route) -> RouteEndpoints {
        RouteEndpoints {
            from_airport_id: self.from_airport_id.unwrap_or(current.from_airport_id),
            to_airport_id: self.to_airport_id.unwrap_or(current.to_airport_id),
            airline_id: self.airline_id.unwrap_or(current.airline_id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteSort {
    Id,
    FromAirportId,
    ToAirportId,
    AirlineId,
    DistanceKm,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl RouteSort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FromAirportId => "from_airport_id",
            Self::ToAirportId => "to_airport_id",
            Self::AirlineId => "airline_id",
            Self::DistanceKm => "distance_km",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for RouteSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Self::Id,
            "fromAirportId" => Self::FromAirportId,
            "toAirportId" => Self::ToAirportId,
            "airlineId" => Self::AirlineId,
            "distanceKm" => Self::DistanceKm,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => return Err(format!("Invalid sortBy '{other}' for routes")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRelation {
    FromAirport,
    ToAirport,
    Airline,
}

impl RouteRelation {
    pub const ALL: [Self; 3] = [Self::FromAirport, Self::ToAirport, Self::Airline];
}

impl FromStr for RouteRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fromAirport" => Ok(Self::FromAirport),
            "toAirport" => Ok(Self::ToAirport),
            "airline" => Ok(Self::Airline),
            other => Err(format!("Invalid include '{other}' for routes")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub search: Option<String>,
    pub from_airport_id: Option<Uuid>,
    pub to_airport_id: Option<Uuid>,
    pub airline_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteQuery {
    pub page: PageRequest,
    pub sort_by: RouteSort,
    pub sort_order: SortOrder,
    pub filter: RouteFilter,
    pub include: Vec<RouteRelation>,
}

#[derive(Debug, Clone)]
pub struct RouteView {
    pub route: Route,
    pub from_airport: Option<Airport>,
    pub to_airport: Option<Airport>,
    pub airline: Option<Airline>,
}

impl From<Route> for RouteView {
    fn from(route: Route) -> Self {
        Self { route, from_airport: None, to_airport: None, airline: None }
    }
}
