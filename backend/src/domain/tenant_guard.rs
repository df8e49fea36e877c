//! Cross-tenant write protection.
//!
//! Every tenant-scoped use-case checks the caller's recorded organisation
//! against the organisation named in the request before touching data.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::ports::OrgRepository;
use crate::domain::{Error, OrgId, UserId};

/// Authorises callers against their recorded organisation.
pub struct TenantGuard<R> {
    orgs: Arc<R>,
}

impl<R> Clone for TenantGuard<R> {
    fn clone(&self) -> Self {
        Self {
            orgs: Arc::clone(&self.orgs),
        }
    }
}

impl<R> TenantGuard<R> {
    /// Create a guard reading memberships from `orgs`.
    pub fn new(orgs: Arc<R>) -> Self {
        Self { orgs }
    }
}

impl<R: OrgRepository> TenantGuard<R> {
    /// Fail with `permission_denied` unless `caller` belongs to `org_id`.
    ///
    /// Callers without any organisation are rejected the same way.
    pub async fn authorize(&self, caller: &UserId, org_id: &OrgId) -> Result<(), Error> {
        let recorded = self.orgs.find_org_for_user(caller).await?;
        match recorded {
            Some(own) if &own == org_id => Ok(()),
            _ => {
                warn!(user_id = %caller, org_id = %org_id, "cross-tenant access rejected");
                Err(Error::permission_denied("caller does not belong to this organisation")
                    .with_details(json!({ "orgId": org_id.as_ref() })))
            }
        }
    }
}
