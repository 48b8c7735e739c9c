//! Authentication module for Keygate.
//!
//! A single HTTP basic credential pair guards the provisioning route:
//! - Gate: the pure accept/reject decision
//! - Middleware: header extraction and the `WWW-Authenticate` challenge

mod gate;
mod middleware;

pub use gate::*;
pub use middleware::*;
