//! Shared application state and the health endpoint.

use axum::{
    http::{Method, StatusCode},
    routing::get,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::Endpoint;
use crate::db::IdentityStore;
use crate::iam::Iam;
use crate::routes::Route;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub iam: Iam,
    pub identities: Arc<dyn IdentityStore>,
}

impl AppState {
    pub fn new(iam: Iam, identities: Arc<dyn IdentityStore>) -> Self {
        Self { iam, identities }
    }
    pub fn iam(&self) -> &Iam {
        &self.iam
    }
    pub fn identities(&self) -> &dyn IdentityStore {
        self.identities.as_ref()
    }
}

pub fn endpoints() -> Vec<Endpoint> {
    vec![Endpoint::new(Route::public(Method::GET, "/health"), get(health))]
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "portal" })),
    )
}
