use crate::domain::airport::Airport;
use crate::domain::pagination::{PageRequest, SortOrder};
use crate::domain::route::RouteView;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Airline {
    pub id: Uuid,
    pub name: String,
    pub base_country: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAirline {
    pub name: String,
    pub base_country: String,
    /// Never empty.
    pub serviced_airport_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirlinePatch {
    pub name: Option<String>,
    pub base_country: Option<String>,
    /// When present, replaces the serviced set entirely.
    pub serviced_airport_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AirlineSort {
    Id,
    #[default]
    Name,
    BaseCountry,
    CreatedAt,
    UpdatedAt,
}

impl AirlineSort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::BaseCountry => "base_country",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for AirlineSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Self::Id,
            "name" => Self::Name,
            "baseCountry" => Self::BaseCountry,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => return Err(format!("Invalid sortBy '{other}' for airlines")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirlineRelation {
    ServicedAirports,
    OperatedRoutes,
}

impl FromStr for AirlineRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "servicedAirports" => Ok(Self::ServicedAirports),
            "operatedRoutes" => Ok(Self::OperatedRoutes),
            other => Err(format!("Invalid include '{other}' for airlines")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AirlineFilter {
    pub search: Option<String>,
    /// Matched case-insensitively.
    pub base_countries: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AirlineQuery {
    pub page: PageRequest,
    pub sort_by: AirlineSort,
    pub sort_order: SortOrder,
    pub filter: AirlineFilter,
    pub include: Vec<AirlineRelation>,
}

#[derive(Debug, Clone)]
pub struct AirlineView {
    pub airline: Airline,
    pub serviced_airports: Option<Vec<Airport>>,
    pub operated_routes: Option<Vec<RouteView>>,
}

impl From<Airline> for AirlineView {
    fn from(airline: Airline) -> Self {
        Self { airline, serviced_airports: None, operated_routes: None }
    }
}
