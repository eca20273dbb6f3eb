//! HTTP middleware for the back office.

pub mod auth;

pub use auth::RequireAdminToken;
