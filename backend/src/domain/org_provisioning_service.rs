//! Lazy organisation provisioning.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{OrgProvisioning, OrgRepository};
use crate::domain::{Error, OrgId, UserId};

/// Service implementing [`OrgProvisioning`].
///
/// The fast path returns an existing mapping without writing. Otherwise a
/// candidate id is generated and handed to the repository, which records the
/// membership and the user mapping in one serialised transaction and reports
/// whichever id won.
#[derive(Clone)]
pub struct OrgProvisioningService<R> {
    orgs: Arc<R>,
}

impl<R> OrgProvisioningService<R> {
    /// Create a service over the given repository.
    pub fn new(orgs: Arc<R>) -> Self {
        Self { orgs }
    }
}

#[async_trait]
impl<R> OrgProvisioning for OrgProvisioningService<R>
where
    R: OrgRepository,
{
    async fn ensure_org(&self, user_id: &UserId) -> Result<OrgId, Error> {
        if let Some(existing) = self.orgs.find_org_for_user(user_id).await? {
            debug!(user_id = %user_id, org_id = %existing, "org already provisioned");
            return Ok(existing);
        }

        let candidate = OrgId::generate();
        let org_id = self.orgs.provision(user_id, &candidate).await?;
        if org_id == candidate {
            info!(user_id = %user_id, org_id = %org_id, "provisioned org");
        } else {
            debug!(
                user_id = %user_id,
                org_id = %org_id,
                "concurrent provisioning won; reusing its org"
            );
        }
        Ok(org_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockOrgRepository, OrgRepositoryError};

    fn org(raw: &str) -> OrgId {
        OrgId::new(raw).expect("valid org")
    }

    #[tokio::test]
    async fn existing_mapping_is_returned_without_writing() {
        let mut repo = MockOrgRepository::new();
        repo.expect_find_org_for_user()
            .times(1)
            .return_once(|_| Ok(Some(org("org_existing"))));
        repo.expect_provision().never();

        let service = OrgProvisioningService::new(Arc::new(repo));
        let org_id = service
            .ensure_org(&UserId::random())
            .await
            .expect("existing org");
        assert_eq!(org_id, org("org_existing"));
    }

    #[tokio::test]
    async fn first_call_provisions_a_generated_org() {
        let mut repo = MockOrgRepository::new();
        repo.expect_find_org_for_user()
            .times(1)
            .return_once(|_| Ok(None));
        repo.expect_provision()
            .times(1)
            .withf(|_, candidate| candidate.as_ref().starts_with("org_"))
            .returning(|_, candidate| Ok(candidate.clone()));

        let service = OrgProvisioningService::new(Arc::new(repo));
        let org_id = service
            .ensure_org(&UserId::random())
            .await
            .expect("provisioned");
        assert!(org_id.as_ref().starts_with("org_"));
    }

    #[tokio::test]
    async fn losing_a_race_returns_the_winning_org() {
        let mut repo = MockOrgRepository::new();
        repo.expect_find_org_for_user().return_once(|_| Ok(None));
        repo.expect_provision()
            .return_once(|_, _| Ok(org("org_winner")));

        let service = OrgProvisioningService::new(Arc::new(repo));
        let org_id = service
            .ensure_org(&UserId::random())
            .await
            .expect("winner");
        assert_eq!(org_id, org("org_winner"));
    }

    #[tokio::test]
    async fn query_failures_surface_as_internal_errors() {
        let mut repo = MockOrgRepository::new();
        repo.expect_find_org_for_user()
            .return_once(|_| Err(OrgRepositoryError::query("syntax")));

        let service = OrgProvisioningService::new(Arc::new(repo));
        let err = service
            .ensure_org(&UserId::random())
            .await
            .expect_err("query failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
