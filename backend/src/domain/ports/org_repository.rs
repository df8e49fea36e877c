//! Port for the user → organisation mapping and org membership.

use async_trait::async_trait;

use crate::domain::{OrgId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by organisation repository adapters.
    pub enum OrgRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "org repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "org repository query failed: {message}"; InternalError,
    }
}

/// Persistence for organisation ownership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrgRepository: Send + Sync {
    /// Organisation currently mapped to `user_id`, if any.
    async fn find_org_for_user(&self, user_id: &UserId)
    -> Result<Option<OrgId>, OrgRepositoryError>;

    /// Bind `candidate` to `user_id` unless the user already owns an org.
    ///
    /// Implementations must record the membership and the mapping in one
    /// all-or-nothing step and serialise concurrent calls for the same user:
    /// whichever call commits first wins, and every call returns the org id
    /// that ended up mapped.
    async fn provision(
        &self,
        user_id: &UserId,
        candidate: &OrgId,
    ) -> Result<OrgId, OrgRepositoryError>;
}
