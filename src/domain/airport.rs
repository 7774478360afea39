use crate::domain::airline::Airline;
use crate::domain::geo::GeoPoint;
use crate::domain::pagination::{PageRequest, SortOrder};
use crate::domain::route::RouteView;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub country: String,
    pub location: GeoPoint,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated input for creating an airport.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAirport {
    pub name: String,
    pub code: String,
    pub country: String,
    pub location: GeoPoint,
}

/// Partial update; coordinates are validated after merging with the stored row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AirportPatch {
    /// Applies the patch on top of `current`.
    ///
    /// # Errors
    /// Returns a message if the merged coordinates are out of range.
    pub fn apply(self, current: &Airport) -> Result<NewAirport, String> {
        let location = GeoPoint::new(
            self.latitude.unwrap_or_else(|| current.location.latitude()),
            self.longitude.unwrap_or_else(|| current.location.longitude()),
        )?;
        Ok(NewAirport {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            code: self.code.unwrap_or_else(|| current.code.clone()),
            country: self.country.unwrap_or_else(|| current.country.clone()),
            location,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AirportSort {
    Id,
    #[default]
    Name,
    Code,
    Country,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
}

impl AirportSort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Code => "code",
            Self::Country => "country",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for AirportSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Self::Id,
            "name" => Self::Name,
            "code" => Self::Code,
            "country" => Self::Country,
            "latitude" => Self::Latitude,
            "longitude" => Self::Longitude,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => return Err(format!("Invalid sortBy '{other}' for airports")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportRelation {
    ServicedByAirlines,
    RoutesFrom,
    RoutesTo,
}

impl FromStr for AirportRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "servicedByAirlines" => Ok(Self::ServicedByAirlines),
            "routesFrom" => Ok(Self::RoutesFrom),
            "routesTo" => Ok(Self::RoutesTo),
            other => Err(format!("Invalid include '{other}' for airports")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AirportFilter {
    pub search: Option<String>,
    pub countries: Vec<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AirportQuery {
    pub page: PageRequest,
    pub sort_by: AirportSort,
    pub sort_order: SortOrder,
    pub filter: AirportFilter,
    pub include: Vec<AirportRelation>,
}

/// An airport with whichever relations the caller asked for.
#[derive(Debug, Clone)]
pub struct AirportView {
    pub airport: Airport,
    pub serviced_by_airlines: Option<Vec<Airline>>,
    pub routes_from: Option<Vec<RouteView>>,
    pub routes_to: Option<Vec<RouteView>>,
}

impl From<Airport> for AirportView {
    fn from(airport: Airport) -> Self {
        Self { airport, serviced_by_airlines: None, routes_from: None, routes_to: None }
    }
}
