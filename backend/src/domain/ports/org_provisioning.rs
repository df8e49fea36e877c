//! Driving port for lazily provisioning a clinic organisation.

use async_trait::async_trait;

use crate::domain::{Error, OrgId, UserId};

/// Use-case port behind the `ensureOrgForUser` callable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrgProvisioning: Send + Sync {
    /// Return the caller's organisation, creating it on first use.
    ///
    /// Concurrent calls for the same user resolve to the same identifier.
    async fn ensure_org(&self, user_id: &UserId) -> Result<OrgId, Error>;
}
