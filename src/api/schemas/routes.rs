use crate::api::schemas::airlines::AirlineResponse;
use crate::api::schemas::airports::AirportResponse;
use crate::api::schemas::{ListParams, non_empty};
use crate::domain::pagination::parse_list;
use crate::domain::route::{Route, RouteEndpoints, RouteFilter, RoutePatch, RouteQuery, RouteView};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// `distanceKm` is not accepted; any value a client sends is ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoute {
    pub from_airport_id: Uuid,
    pub to_airport_id: Uuid,
    pub airline_id: Uuid,
}

impl From<CreateRoute> for RouteEndpoints {
    fn from(body: CreateRoute) -> Self {
        Self { from_airport_id: body.from_airport_id, to_airport_id: body.to_airport_id, airline_id: body.airline_id }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoute {
    pub from_airport_id: Option<Uuid>,
    pub to_airport_id: Option<Uuid>,
    pub airline_id: Option<Uuid>,
}

impl From<UpdateRoute> for RoutePatch {
    fn from(body: UpdateRoute) -> Self {
        Self { from_airport_id: body.from_airport_id, to_airport_id: body.to_airport_id, airline_id: body.airline_id }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteListParams {
    #[serde(flatten)]
    pub list: ListParams,
    pub from_airport_id: Option<String>,
    pub to_airport_id: Option<String>,
    pub airline_id: Option<String>,
}

impl TryFrom<RouteListParams> for RouteQuery {
    type Error = String;

    fn try_from(params: RouteListParams) -> Result<Self, Self::Error> {
        let list = &params.list;
        Ok(Self {
            page: list.page_request()?,
            sort_by: list.sort_by()?,
            sort_order: list.sort_order()?,
            include: list.include()?,
            filter: RouteFilter {
                search: list.search(),
                from_airport_id: parse_id("fromAirportId", params.from_airport_id.as_deref())?,
                to_airport_id: parse_id("toAirportId", params.to_airport_id.as_deref())?,
                airline_ids: parse_list(params.airline_id.as_deref())
                    .map_err(|_| "airlineId must be a comma-separated list of UUIDs".to_string())?,
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub id: Uuid,
    pub from_airport_id: Uuid,
    pub to_airport_id: Uuid,
    pub airline_id: Uuid,
    pub distance_km: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_airport: Option<AirportResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_airport: Option<AirportResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<AirlineResponse>,
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            from_airport_id: route.from_airport_id,
            to_airport_id: route.to_airport_id,
            airline_id: route.airline_id,
            distance_km: route.distance_km,
            created_at: route.created_at,
            updated_at: route.updated_at,
            from_airport: None,
            to_airport: None,
            airline: None,
        }
    }
}

impl From<RouteView> for RouteResponse {
    fn from(view: RouteView) -> Self {
        Self {
            from_airport: view.from_airport.map(Into::into),
            to_airport: view.to_airport.map(Into::into),
            airline: view.airline.map(Into::into),
            ..view.route.into()
        }
    }
}

fn parse_id(name: &str, raw: Option<&str>) -> Result<Option<Uuid>, String> {
    non_empty(raw).map(|v| v.parse::<Uuid>().map_err(|_| format!("{name} must be a UUID"))).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_supplied_distance_is_ignored() {
        let from = Uuid::new_v4();
        let body: CreateRoute = serde_json::from_value(serde_json::json!({
            "fromAirportId": from,
            "toAirportId": Uuid::new_v4(),
            "airlineId": Uuid::new_v4(),
            "distanceKm": 1,
        }))
        .unwrap();
        assert_eq!(RouteEndpoints::from(body).from_airport_id, from);
    }

    #[test]
    fn test_list_params_parse_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let params = RouteListParams { airline_id: Some(format!("{a},{b}")), ..Default::default() };
        let query = RouteQuery::try_from(params).unwrap();
        assert_eq!(query.filter.airline_ids, vec![a, b]);

        let params = RouteListParams { from_airport_id: Some("JFK".to_string()), ..Default::default() };
        assert_eq!(RouteQuery::try_from(params).unwrap_err(), "fromAirportId must be a UUID");
    }
}
