//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: process-local repositories for database-less runs and tests
//! - **cache**: response caches for idempotent replays (in-process or Redis)
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod cache;
pub mod memory;
pub mod persistence;
