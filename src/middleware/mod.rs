//! Request interception: the authorization gate and the request-scoped identity it sets.

pub mod auth;

pub use auth::{authorize, CurrentUser, Gate};
