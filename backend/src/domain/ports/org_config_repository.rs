//! Port for per-org newsletter configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{OrgConfig, OrgId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by org config adapters.
    pub enum OrgConfigRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "org config connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "org config query failed: {message}"; InternalError,
    }
}

/// Persistence for [`OrgConfig`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrgConfigRepository: Send + Sync {
    /// Stored configuration, if any was ever saved.
    async fn find(&self, org_id: &OrgId) -> Result<Option<OrgConfig>, OrgConfigRepositoryError>;

    /// Replace the stored configuration.
    async fn save(
        &self,
        org_id: &OrgId,
        config: &OrgConfig,
        at: DateTime<Utc>,
    ) -> Result<(), OrgConfigRepositoryError>;
}
