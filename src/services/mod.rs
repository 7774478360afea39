pub mod account_service;
pub mod airline_service;
pub mod airport_service;
pub mod auth_service;
pub mod health_service;
pub(crate) mod relations;
pub mod route_service;
