//! User portal API core: session-backed JWT authentication and a route table
//! that gates every request on its declared authorization requirement.
//!
//! Requests flow through [`middleware::authorize`] before any handler runs.
//! Protected routes get the caller's subject as [`middleware::CurrentUser`].

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod iam;
pub mod middleware;
pub mod models;
pub mod routes;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use iam::Iam;

use axum::http::StatusCode;
use middleware::Gate;
use routes::{RouteError, RouteTableBuilder};
use tower_http::trace::TraceLayer;

/// Build the API router with the authorization gate in front of every route.
/// Used by main and by integration tests.
pub fn create_app(state: AppState) -> Result<axum::Router, RouteError> {
    let endpoints = handlers::endpoints();

    let table = RouteTableBuilder::new()
        .routes(endpoints.iter().map(|e| e.route.clone()))
        .build()?;
    let gate = Gate::new(table, state.iam.clone());

    let router = endpoints
        .into_iter()
        .fold(axum::Router::new(), |router, endpoint| {
            router.route(&endpoint.route.path, endpoint.handler)
        });

    Ok(router
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(axum::middleware::from_fn_with_state(
            gate,
            middleware::authorize,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
