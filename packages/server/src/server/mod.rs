// HTTP server: axum app wiring, middleware and REST routes

pub mod app;
pub mod middleware;
pub mod routes;

pub use app::{build_app, AxumAppState};
