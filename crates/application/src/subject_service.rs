use std::sync::Arc;

use rolegate_core::{AppError, AppResult, PageRequest, SubjectId};
use rolegate_domain::{AuthorizationSubject, EmailAddress, Subject};
use tracing::info;

use crate::rbac_ports::{NewSubject, RegisterSubjectInput, SubjectRepository};


/// Application service for the subject directory.
#[derive(Clone)]
pub struct SubjectService {
    subject_repository: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(subject_repository: Arc<dyn SubjectRepository>) -> Self {
        Self { subject_repository }
    }

    /// Registers a subject keyed by a normalized email.
    pub async fn register_subject(&self, input: RegisterSubjectInput) -> AppResult<Subject> {
        let email = EmailAddress::new(input.email)?;

        if self
            .subject_repository
            .find_subject_by_email(&email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "subject '{}' already exists",
                email.as_str()
            )));
        }

        let display_name = input
            .display_name
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let subject = self
            .subject_repository
            .create_subject(NewSubject {
                email,
                display_name,
                is_active: input.is_active,
                is_superuser: input.is_superuser,
            })
            .await?;

        info!(
            subject_id = %subject.id(),
            is_superuser = subject.is_superuser(),
            "subject registered"
        );
        Ok(subject)
    }

    /// Returns a subject with its roles and permissions.
    pub async fn get_subject(&self, subject_id: SubjectId) -> AppResult<AuthorizationSubject> {
        self.subject_repository
            .load_subject_with_roles_and_permissions(subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))
    }

    /// Returns a subject by email.
    pub async fn get_subject_by_email(&self, email: &str) -> AppResult<Subject> {
        let email = EmailAddress::new(email)?;

        self.subject_repository
            .find_subject_by_email(&email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("subject '{}' was not found", email.as_str()))
            })
    }

    /// Lists a page of subjects in id order.
    pub async fn list_subjects(&self, page: PageRequest) -> AppResult<Vec<Subject>> {
        self.subject_repository.list_subjects(page).await
    }

    /// Toggles the superuser flag.
    pub async fn set_superuser(
        &self,
        subject_id: SubjectId,
        is_superuser: bool,
    ) -> AppResult<Subject> {
        let subject = self
            .subject_repository
            .set_superuser(subject_id, is_superuser)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))?;

        info!(subject_id = %subject_id, is_superuser, "subject superuser flag updated");
        Ok(subject)
    }
}
