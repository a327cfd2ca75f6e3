use std::sync::Arc;

use rolegate_core::{AppResult, RoleId, SubjectId};
use rolegate_domain::AuthorizationSubject;
use tracing::info;

use crate::rbac_ports::SubjectRepository;


/// Application service attaching roles to subjects.
#[derive(Clone)]
pub struct AssignmentService {
    subject_repository: Arc<dyn SubjectRepository>,
}

impl AssignmentService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(subject_repository: Arc<dyn SubjectRepository>) -> Self {
        Self { subject_repository }
    }

    /// Grants a role to a subject. Assigning a role already held is a no-op.
    ///
    /// The role is resolved before the subject, so a request naming two
    /// missing entities reports the role.
    pub async fn assign_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        let subject = self
            .subject_repository
            .assign_role(subject_id, role_id)
            .await?;

        info!(subject_id = %subject_id, role_id = %role_id, "role assigned");
        Ok(subject)
    }

    /// Revokes a role from a subject. Revoking a role not held is a no-op.
    pub async fn remove_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        let subject = self
            .subject_repository
            .remove_role(subject_id, role_id)
            .await?;

        info!(subject_id = %subject_id, role_id = %role_id, "role removed");
        Ok(subject)
    }
}
