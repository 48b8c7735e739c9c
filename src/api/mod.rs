//! HTTP API layer for Keygate.
//!
//! Exposes the health route and the authenticated key provisioning route.

pub mod handlers;
mod routes;

pub use routes::build_router;
