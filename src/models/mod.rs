//! Data models for accounts and sessions.

pub mod session;
pub mod user;

pub use session::Session;
pub use user::{Credential, User};
