//! Authorization gate run in front of every handler.
//!
//! Unknown (method, path) pairs get `404` before anything else is looked at.
//! Protected routes need a bearer token that resolves to an active session;
//! its subject is then exposed to handlers as [`CurrentUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::iam::{Iam, IamError};
use crate::routes::RouteTable;

/// Subject of the authorized session, stored in request extensions under the
/// `current_user` key. Only present on protected routes that passed the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub const KEY: &'static str = "current_user";

    /// Parses the subject into an account id.
    pub fn account_id(&self) -> AppResult<i64> {
        self.0.parse().map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "{} {:?} is not an account id",
                Self::KEY,
                self.0
            ))
        })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "{} missing from request context",
                Self::KEY
            ))
        })
    }
}

#[derive(Clone)]
pub struct Gate {
    routes: Arc<RouteTable>,
    iam: Iam,
}

impl Gate {
    pub fn new(routes: RouteTable, iam: Iam) -> Self {
        Self {
            routes: Arc::new(routes),
            iam,
        }
    }
}

/// Middleware: route lookup, authorization, and JSON content-type on responses
/// to JSON requests. Install with `axum::middleware::from_fn_with_state`.
pub async fn authorize(State(gate): State<Gate>, mut request: Request, next: Next) -> Response {
    let requires_authorization = match gate.routes.find(request.method(), request.uri().path()) {
        Some(route) => route.requires_authorization,
        None => {
            debug!(method = %request.method(), path = %request.uri().path(), "path not found");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    if requires_authorization {
        let header = match request
            .headers()
            .get(AUTHORIZATION)
            .map(HeaderValue::to_str)
            .transpose()
        {
            Ok(header) => header,
            Err(_) => return reject(&request, IamError::MalformedHeader),
        };

        let authorized = gate.iam.authorize(header).await;
        match authorized {
            Ok(session) => {
                debug!(session_id = session.id, sub = %session.subject, "authorized user");
                request
                    .extensions_mut()
                    .insert(CurrentUser(session.subject));
            }
            Err(e) => return reject(&request, e),
        }
    }

    let wants_json = declares_json(request.headers());
    let mut response = next.run(request).await;
    if wants_json {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    response
}

fn reject(request: &Request, err: IamError) -> Response {
    debug!(
        method = %request.method(),
        path = %request.uri().path(),
        error = %err,
        "authorization failed"
    );
    AppError::Iam(err).into_response()
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
