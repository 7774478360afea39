pub mod airline;
pub mod airport;
pub mod auth;
pub mod auth_session;
pub mod geo;
pub mod pagination;
pub mod route;
pub mod user;
