//! Clinic newsletter backend.
//!
//! Multi-tenant core for clinic newsletters: org provisioning, CSV subscriber
//! imports, tracking links with deduplicated conversion logging, and
//! conversion reporting. The crate follows a hexagonal layout: [`domain`]
//! owns the rules and ports, [`inbound`] and [`outbound`] hold adapters, and
//! [`client`] wraps the callables for Rust consumers.

pub mod client;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
