//! Microblog library: domain model, adapters and request middleware.
//!
//! The binary in `main.rs` wires these modules into an Actix server.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use domain::TraceId;
pub use middleware::Trace;
