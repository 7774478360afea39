use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::airline_service::AirlineService;
use crate::services::airport_service::AirportService;
use crate::services::auth_service::AuthService;
use crate::services::health_service::HealthService;
use crate::services::route_service::RouteService;
use crate::storage::DbPool;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Method, Request, header};
use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod airlines;
pub mod airports;
pub mod auth;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod schemas;
pub mod users;

/// Every public route lives under this prefix.
pub const API_PREFIX: &str = "/api";

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub airport_service: AirportService,
    pub airline_service: AirlineService,
    pub route_service: RouteService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub pool: DbPool,
    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub airport_service: AirportService,
    pub airline_service: AirlineService,
    pub route_service: RouteService,
}

/// Configures and returns the primary application router.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let cors = cors_layer(&config.server.cors_origins);

    let state = AppState {
        config,
        auth_service: services.auth_service,
        account_service: services.account_service,
        airport_service: services.airport_service,
        airline_service: services.airline_service,
        route_service: services.route_service,
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile));

    let user_routes = Router::new().route("/me", patch(users::update_me));

    let airport_routes = Router::new()
        .route("/", get(airports::list_airports).post(airports::create_airport))
        .route(
            "/{id}",
            get(airports::get_airport).patch(airports::update_airport).delete(airports::delete_airport),
        );

    let airline_routes = Router::new()
        .route("/", get(airlines::list_airlines).post(airlines::create_airline))
        .route(
            "/{id}",
            get(airlines::get_airline).patch(airlines::update_airline).delete(airlines::delete_airline),
        );

    let route_routes = Router::new()
        .route("/", get(routes::list_routes).post(routes::create_route))
        .route("/{id}", get(routes::get_route).patch(routes::update_route).delete(routes::delete_route));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/airports", airport_routes)
        .nest("/airlines", airline_routes)
        .nest("/routes", route_routes);

    Router::new()
        .nest(API_PREFIX, api_routes)
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}

/// Allows the configured origins, or any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() { layer.allow_origin(Any) } else { layer.allow_origin(AllowOrigin::list(allowed)) }
}
