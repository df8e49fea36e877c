//! Response cache adapters for idempotent replays.
//!
//! [`MemoryResponseCache`] keeps entries in process and is the default.
//! [`RedisResponseCache`] shares entries across instances through a `bb8`
//! pool of Redis connections.

mod memory;
mod redis;

pub use memory::MemoryResponseCache;
pub use redis::RedisResponseCache;
