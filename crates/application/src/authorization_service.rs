use std::sync::Arc;

use rolegate_core::{AppError, AppResult, SubjectId};
use rolegate_domain::{AccessDecision, AccessRequirement, AuthorizationSubject};
use tracing::{debug, warn};

use crate::rbac_ports::SubjectRepository;

#[cfg(test)]
mod tests;

/// Application service guarding operations behind permission and role checks.
///
/// Each check loads the subject with its roles and permissions in one read and
/// evaluates against that snapshot.
#[derive(Clone)]
pub struct AuthorizationService {
    subject_repository: Arc<dyn SubjectRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a subject repository.
    #[must_use]
    pub fn new(subject_repository: Arc<dyn SubjectRepository>) -> Self {
        Self { subject_repository }
    }

    /// Resolves the current subject. Unknown ids resolve to `None`.
    pub async fn current_subject(
        &self,
        subject_id: Option<SubjectId>,
    ) -> AppResult<Option<AuthorizationSubject>> {
        let Some(subject_id) = subject_id else {
            return Ok(None);
        };

        self.subject_repository
            .load_subject_with_roles_and_permissions(subject_id)
            .await
    }

    /// Ensures the current subject meets the requirement and returns it.
    pub async fn authorize(
        &self,
        subject_id: Option<SubjectId>,
        requirement: &AccessRequirement,
    ) -> AppResult<AuthorizationSubject> {
        let subject = self.current_subject(subject_id).await?;

        let decision = requirement.evaluate(subject.as_ref());
        debug!(
            subject_id = ?subject_id,
            requirement = %requirement,
            decision = ?decision,
            "access evaluated"
        );

        match (decision, subject) {
            (AccessDecision::Allowed, Some(subject)) => Ok(subject),
            (AccessDecision::Denied, Some(subject)) => {
                let subject_id = subject.subject().id();
                warn!(subject_id = %subject_id, requirement = %requirement, "access denied");
                Err(AppError::Forbidden(format!(
                    "subject '{subject_id}' is missing {requirement}"
                )))
            }
            _ => Err(AppError::Unauthorized("authentication required".to_owned())),
        }
    }

    /// Ensures the current subject holds a permission.
    pub async fn require_permission(
        &self,
        subject_id: Option<SubjectId>,
        permission_name: &str,
    ) -> AppResult<AuthorizationSubject> {
        self.authorize(subject_id, &AccessRequirement::permission(permission_name))
            .await
    }

    /// Ensures the current subject holds a role.
    pub async fn require_role(
        &self,
        subject_id: Option<SubjectId>,
        role_name: &str,
    ) -> AppResult<AuthorizationSubject> {
        self.authorize(subject_id, &AccessRequirement::role(role_name))
            .await
    }

    /// Returns whether the current subject holds a permission.
    pub async fn has_permission(
        &self,
        subject_id: Option<SubjectId>,
        permission_name: &str,
    ) -> AppResult<bool> {
        let subject = self.current_subject(subject_id).await?;
        Ok(rolegate_domain::has_permission(
            subject.as_ref(),
            permission_name,
        ))
    }

    /// Returns whether the current subject holds a role.
    pub async fn has_role(&self, subject_id: Option<SubjectId>, role_name: &str) -> AppResult<bool> {
        let subject = self.current_subject(subject_id).await?;
        Ok(rolegate_domain::has_role(subject.as_ref(), role_name))
    }

    /// Evaluates a requirement for a specific, existing subject.
    pub async fn evaluate_subject_access(
        &self,
        subject_id: SubjectId,
        requirement: &AccessRequirement,
    ) -> AppResult<AccessDecision> {
        let subject = self
            .current_subject(Some(subject_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))?;

        Ok(requirement.evaluate(Some(&subject)))
    }
}
