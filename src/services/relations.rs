use crate::domain::airline::Airline;
use crate::domain::airport::Airport;
use crate::domain::route::{Route, RouteRelation, RouteView};
use crate::error::Result;
use crate::storage::airline_repo::AirlineRepository;
use crate::storage::airport_repo::AirportRepository;
use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

/// Loads the requested route relations with one query per relation kind.
#[tracing::instrument(level = "debug", skip_all, fields(routes = routes.len()), err)]
pub(crate) async fn expand_routes(
    conn: &mut PgConnection,
    airport_repo: &AirportRepository,
    airline_repo: &AirlineRepository,
    routes: Vec<Route>,
    relations: &[RouteRelation],
) -> Result<Vec<RouteView>> {
    let wants_from = relations.contains(&RouteRelation::FromAirport);
    let wants_to = relations.contains(&RouteRelation::ToAirport);
    let wants_airline = relations.contains(&RouteRelation::Airline);

    let mut airport_ids = Vec::new();
    if wants_from {
        airport_ids.extend(routes.iter().map(|r| r.from_airport_id));
    }
    if wants_to {
        airport_ids.extend(routes.iter().map(|r| r.to_airport_id));
    }
    airport_ids.sort_unstable();
    airport_ids.dedup();

    let airports: HashMap<Uuid, Airport> =
        airport_repo.find_by_ids(conn, &airport_ids).await?.into_iter().map(|a| (a.id, a)).collect();

    let airlines: HashMap<Uuid, Airline> = if wants_airline {
        let mut ids: Vec<Uuid> = routes.iter().map(|r| r.airline_id).collect();
        ids.sort_unstable();
        ids.dedup();
        airline_repo.find_by_ids(conn, &ids).await?.into_iter().map(|a| (a.id, a)).collect()
    } else {
        HashMap::new()
    };

    Ok(routes
        .into_iter()
        .map(|route| RouteView {
            from_airport: wants_from.then(|| airports.get(&route.from_airport_id).cloned()).flatten(),
            to_airport: wants_to.then(|| airports.get(&route.to_airport_id).cloned()).flatten(),
            airline: wants_airline.then(|| airlines.get(&route.airline_id).cloned()).flatten(),
            route,
        })
        .collect())
}

/// Buckets `(owner, item)` pairs by owner, keeping each bucket in input order.
pub(crate) fn group_by_owner<T>(pairs: Vec<(Uuid, T)>) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for (owner, item) in pairs {
        grouped.entry(owner).or_default().push(item);
    }
    grouped
}
