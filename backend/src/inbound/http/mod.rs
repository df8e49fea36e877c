//! HTTP inbound adapter.
//!
//! Handlers translate requests into driving-port calls and map domain errors
//! onto status codes; they hold no business rules of their own.

pub mod error;
pub mod health;
pub mod idempotency;
pub mod rpc;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tracking_pages;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Routes mounted under `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .configure(rpc::configure)
        .service(tracking_pages::legacy_track)
        .service(tracking_pages::public_conversion_report)
        .service(tracking_pages::public_conversion_report_preflight);
}

/// Public tracking-link routes mounted at the root.
pub fn configure_tracking(cfg: &mut web::ServiceConfig) {
    cfg.service(tracking_pages::follow_tracking_link)
        .service(tracking_pages::track_open);
}
