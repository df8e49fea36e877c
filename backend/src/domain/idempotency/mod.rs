//! Idempotency primitives for safely retried requests.
//!
//! - [`IdempotencyKey`]: opaque token carried in the `X-Idempotency-Key`
//!   header; keys export replays.
//! - [`ContentHash`]: deterministic hash of uploaded CSV content; keys the
//!   per-org import log.
//! - [`ImportHashPolicy`]: whether the importer trusts the client hash or
//!   recomputes it.
//! - [`IdempotencyConfig`]: dedup window and replay TTL.

mod config;
mod content_hash;
mod key;

pub use config::IdempotencyConfig;
pub use content_hash::{
    CONTENT_HASH_MAX, ContentHash, ContentHashValidationError, ImportHashPolicy,
};
pub use key::{
    IDEMPOTENCY_KEY_HEADER, IDEMPOTENCY_KEY_MAX, IdempotencyKey, IdempotencyKeyValidationError,
};
