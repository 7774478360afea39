use crate::api::schemas::airlines::AirlineResponse;
use crate::api::schemas::routes::RouteResponse;
use crate::api::schemas::{ListParams, non_empty, required};
use crate::domain::airport::{Airport, AirportFilter, AirportPatch, AirportQuery, AirportView, NewAirport};
use crate::domain::geo::GeoPoint;
use crate::domain::pagination::parse_list;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

const CODE_LEN: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAirport {
    pub name: String,
    pub code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl TryFrom<CreateAirport> for NewAirport {
    type Error = String;

    fn try_from(body: CreateAirport) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("Airport name", body.name)?,
            code: airport_code(&body.code)?,
            country: required("Country", body.country)?,
            location: GeoPoint::new(body.latitude, body.longitude)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAirport {
    pub name: Option<String>,
    pub code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TryFrom<UpdateAirport> for AirportPatch {
    type Error = String;

    fn try_from(body: UpdateAirport) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body.name.map(|n| required("Airport name", n)).transpose()?,
            code: body.code.as_deref().map(airport_code).transpose()?,
            country: body.country.map(|c| required("Country", c)).transpose()?,
            latitude: body.latitude,
            longitude: body.longitude,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AirportListParams {
    #[serde(flatten)]
    pub list: ListParams,
    pub country: Option<String>,
    pub code: Option<String>,
}

impl TryFrom<AirportListParams> for AirportQuery {
    type Error = String;

    fn try_from(params: AirportListParams) -> Result<Self, Self::Error> {
        let list = &params.list;
        Ok(Self {
            page: list.page_request()?,
            sort_by: list.sort_by()?,
            sort_order: list.sort_order()?,
            include: list.include()?,
            filter: AirportFilter {
                search: list.search(),
                countries: parse_list(params.country.as_deref()).unwrap_or_default(),
                code: non_empty(params.code.as_deref()).map(ToString::to_string),
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serviced_by_airlines: Option<Vec<AirlineResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes_from: Option<Vec<RouteResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes_to: Option<Vec<RouteResponse>>,
}

impl From<Airport> for AirportResponse {
    fn from(airport: Airport) -> Self {
        Self {
            id: airport.id,
            name: airport.name,
            code: airport.code,
            country: airport.country,
            latitude: airport.location.latitude(),
            longitude: airport.location.longitude(),
            created_at: airport.created_at,
            updated_at: airport.updated_at,
            serviced_by_airlines: None,
            routes_from: None,
            routes_to: None,
        }
    }
}

impl From<AirportView> for AirportResponse {
    fn from(view: AirportView) -> Self {
        Self {
            serviced_by_airlines: view.serviced_by_airlines.map(|v| v.into_iter().map(Into::into).collect()),
            routes_from: view.routes_from.map(|v| v.into_iter().map(Into::into).collect()),
            routes_to: view.routes_to.map(|v| v.into_iter().map(Into::into).collect()),
            ..view.airport.into()
        }
    }
}

/// Exactly three characters, stored upper-case.
fn airport_code(raw: &str) -> Result<String, String> {
    let code = raw.trim();
    if code.chars().count() != CODE_LEN {
        return Err(format!("Airport code must be exactly {CODE_LEN} characters"));
    }
    Ok(code.to_uppercase())
}
