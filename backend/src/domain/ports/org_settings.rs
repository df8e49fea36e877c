//! Driving port for per-org newsletter configuration.

use async_trait::async_trait;

use crate::domain::{Error, OrgConfig, OrgId, UserId};

/// Use-case port behind `getOrgConfig` and `setOrgConfig`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrgSettings: Send + Sync {
    /// Current configuration, or empty strings when none was saved.
    async fn org_config(&self, caller: &UserId, org_id: &OrgId) -> Result<OrgConfig, Error>;

    /// Overwrite the configuration.
    async fn set_org_config(
        &self,
        caller: &UserId,
        org_id: &OrgId,
        config: OrgConfig,
    ) -> Result<(), Error>;
}
