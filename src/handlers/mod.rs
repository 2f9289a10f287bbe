//! HTTP request handlers and the routes they contribute.

pub mod http;
pub mod user;

pub use http::*;

use axum::routing::MethodRouter;

use crate::routes::Route;

/// A route declaration paired with the handler serving it.
pub struct Endpoint {
    pub route: Route,
    pub handler: MethodRouter<AppState>,
}

impl Endpoint {
    pub fn new(route: Route, handler: MethodRouter<AppState>) -> Self {
        Self { route, handler }
    }
}

/// Every endpoint the service exposes.
pub fn endpoints() -> Vec<Endpoint> {
    let mut all = http::endpoints();
    all.extend(user::endpoints());
    all
}
