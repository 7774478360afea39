use crate::api::schemas::airports::AirportResponse;
use crate::api::schemas::routes::RouteResponse;
use crate::api::schemas::{ListParams, required};
use crate::domain::airline::{Airline, AirlineFilter, AirlinePatch, AirlineQuery, AirlineView, NewAirline};
use crate::domain::pagination::parse_list;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAirline {
    pub name: String,
    pub base_country: String,
    pub serviced_airport_ids: Vec<Uuid>,
}

impl TryFrom<CreateAirline> for NewAirline {
    type Error = String;

    fn try_from(body: CreateAirline) -> Result<Self, Self::Error> {
        if body.serviced_airport_ids.is_empty() {
            return Err("At least one serviced airport is required".to_string());
        }
        Ok(Self {
            name: required("Airline name", body.name)?,
            base_country: required("Base country", body.base_country)?,
            serviced_airport_ids: body.serviced_airport_ids,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAirline {
    pub name: Option<String>,
    pub base_country: Option<String>,
    pub serviced_airport_ids: Option<Vec<Uuid>>,
}

impl TryFrom<UpdateAirline> for AirlinePatch {
    type Error = String;

    fn try_from(body: UpdateAirline) -> Result<Self, Self::Error> {
        if body.serviced_airport_ids.as_ref().is_some_and(Vec::is_empty) {
            return Err("At least one serviced airport is required".to_string());
        }
        Ok(Self {
            name: body.name.map(|n| required("Airline name", n)).transpose()?,
            base_country: body.base_country.map(|c| required("Base country", c)).transpose()?,
            serviced_airport_ids: body.serviced_airport_ids,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineListParams {
    #[serde(flatten)]
    pub list: ListParams,
    pub base_country: Option<String>,
}

impl TryFrom<AirlineListParams> for AirlineQuery {
    type Error = String;

    fn try_from(params: AirlineListParams) -> Result<Self, Self::Error> {
        let list = &params.list;
        Ok(Self {
            page: list.page_request()?,
            sort_by: list.sort_by()?,
            sort_order: list.sort_order()?,
            include: list.include()?,
            filter: AirlineFilter {
                search: list.search(),
                base_countries: parse_list(params.base_country.as_deref()).unwrap_or_default(),
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineResponse {
    pub id: Uuid,
    pub name: String,
    pub base_country: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serviced_airports: Option<Vec<AirportResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operated_routes: Option<Vec<RouteResponse>>,
}

impl From<Airline> for AirlineResponse {
    fn from(airline: Airline) -> Self {
        Self {
            id: airline.id,
            name: airline.name,
            base_country: airline.base_country,
            created_at: airline.created_at,
            updated_at: airline.updated_at,
            serviced_airports: None,
            operated_routes: None,
        }
    }
}

impl From<AirlineView> for AirlineResponse {
    fn from(view: AirlineView) -> Self {
        Self {
            serviced_airports: view.serviced_airports.map(|v| v.into_iter().map(Into::into).collect()),
            operated_routes: view.operated_routes.map(|v| v.into_iter().map(Into::into).collect()),
            ..view.airline.into()
        }
    }
}
