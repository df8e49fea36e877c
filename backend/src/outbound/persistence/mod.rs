//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`; every database error is mapped onto the port's own error
//! type.
//!
//! ```ignore
//! use clinic_newsletter::outbound::persistence::{DbPool, DieselOrgRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/newsletter")).await?;
//! let orgs = DieselOrgRepository::new(pool);
//! ```

pub(crate) mod diesel_basic_error_mapping;
mod diesel_campaign_repository;
mod diesel_conversion_log_repository;
pub(crate) mod diesel_helpers;
mod diesel_org_config_repository;
mod diesel_org_repository;
mod diesel_subscriber_repository;
mod diesel_tracking_link_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_campaign_repository::DieselCampaignRepository;
pub use diesel_conversion_log_repository::DieselConversionLogRepository;
pub use diesel_org_config_repository::DieselOrgConfigRepository;
pub use diesel_org_repository::DieselOrgRepository;
pub use diesel_subscriber_repository::DieselSubscriberRepository;
pub use diesel_tracking_link_repository::DieselTrackingLinkRepository;
pub use migrations::{MigrationError, migrate, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
