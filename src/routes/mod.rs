//! Route metadata: which (method, path) pairs exist and which require authorization.
//!
//! Routes are collected with a [`RouteTableBuilder`] at startup and frozen into a
//! [`RouteTable`], which is read-only for the life of the process. Matching is
//! exact on method and path; there are no patterns or wildcards.

use axum::http::Method;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub requires_authorization: bool,
}

impl Route {
    pub fn public(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            requires_authorization: false,
        }
    }

    pub fn protected(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            requires_authorization: true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route {0} {1} registered twice")]
    Duplicate(Method, String),
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut by_method: HashMap<Method, HashMap<String, Route>> = HashMap::new();
        for route in self.routes {
            let paths = by_method.entry(route.method.clone()).or_default();
            if paths.contains_key(&route.path) {
                return Err(RouteError::Duplicate(route.method, route.path));
            }
            paths.insert(route.path.clone(), route);
        }
        Ok(RouteTable { by_method })
    }
}

/// Two-level lookup: method, then exact path.
#[derive(Debug, Clone)]
pub struct RouteTable {
    by_method: HashMap<Method, HashMap<String, Route>>,
}

impl RouteTable {
    pub fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        self.by_method.get(method)?.get(path)
    }

    pub fn len(&self) -> usize {
        self.by_method.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTableBuilder::new()
            .route(Route::public(Method::POST, "/api/user/login"))
            .routes([
                Route::protected(Method::GET, "/api/user/me"),
                Route::public(Method::GET, "/health"),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn finds_exact_method_and_path() {
        let table = table();
        assert_eq!(table.len(), 3);

        let me = table.find(&Method::GET, "/api/user/me").unwrap();
        assert!(me.requires_authorization);
        let login = table.find(&Method::POST, "/api/user/login").unwrap();
        assert!(!login.requires_authorization);
    }

    #[test]
    fn no_match_on_other_method_or_near_path() {
        let table = table();
        assert!(table.find(&Method::POST, "/api/user/me").is_none());
        assert!(table.find(&Method::GET, "/api/user/me/").is_none());
        assert!(table.find(&Method::GET, "/api/user").is_none());
        assert!(table.find(&Method::DELETE, "/health").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = RouteTableBuilder::new()
            .route(Route::public(Method::GET, "/health"))
            .route(Route::protected(Method::GET, "/health"))
            .build()
            .unwrap_err();
        assert_eq!(err, RouteError::Duplicate(Method::GET, "/health".to_string()));
    }

    #[test]
    fn same_path_different_methods_coexist() {
        let table = RouteTableBuilder::new()
            .route(Route::public(Method::GET, "/items"))
            .route(Route::protected(Method::POST, "/items"))
            .build()
            .unwrap();
        assert!(!table.find(&Method::GET, "/items").unwrap().requires_authorization);
        assert!(table.find(&Method::POST, "/items").unwrap().requires_authorization);
    }
}
