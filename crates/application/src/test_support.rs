use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult, PageRequest, PermissionId, RoleId, SubjectId};
use rolegate_domain::{AuthorizationSubject, EmailAddress, Permission, Role, Subject};

use crate::rbac_ports::{NewSubject, SubjectRepository};

/// Subject directory fake backed by plain vectors.
#[derive(Default)]
pub(crate) struct FakeSubjectDirectory {
    pub(crate) subjects: Mutex<Vec<Subject>>,
    pub(crate) roles: Mutex<Vec<Role>>,
    pub(crate) links: Mutex<BTreeSet<(SubjectId, RoleId)>>,
}

impl FakeSubjectDirectory {
    pub(crate) async fn add_subject(&self, email: &str, is_superuser: bool) -> SubjectId {
        let mut subjects = self.subjects.lock().await;
        let subject_id = SubjectId::from_i64(subjects.len() as i64 + 1);
        subjects.push(Subject::new(
            subject_id,
            EmailAddress::new(email).unwrap_or_else(|_| unreachable!()),
            None,
            true,
            is_superuser,
        ));
        subject_id
    }

    pub(crate) async fn add_role(&self, name: &str, permission_names: &[&str]) -> RoleId {
        let mut roles = self.roles.lock().await;
        let role_id = RoleId::from_i64(roles.len() as i64 + 1);
        let permissions = permission_names
            .iter()
            .enumerate()
            .map(|(index, permission_name)| {
                Permission::new(
                    PermissionId::from_i64(role_id.as_i64() * 100 + index as i64),
                    *permission_name,
                    None,
                    None,
                )
                .unwrap_or_else(|_| unreachable!())
            })
            .collect();
        roles.push(
            Role::new(role_id, name, None, None, permissions).unwrap_or_else(|_| unreachable!()),
        );
        role_id
    }

    async fn hydrate(&self, subject_id: SubjectId) -> Option<AuthorizationSubject> {
        let subject = self
            .subjects
            .lock()
            .await
            .iter()
            .find(|subject| subject.id() == subject_id)
            .cloned()?;
        let links = self.links.lock().await;
        let roles = self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| links.contains(&(subject_id, role.id())))
            .cloned()
            .collect();
        Some(AuthorizationSubject::new(subject, roles))
    }

    async fn role_exists(&self, role_id: RoleId) -> bool {
        self.roles
            .lock()
            .await
            .iter()
            .any(|role| role.id() == role_id)
    }

    async fn subject_exists(&self, subject_id: SubjectId) -> bool {
        self.subjects
            .lock()
            .await
            .iter()
            .any(|subject| subject.id() == subject_id)
    }
}

#[async_trait]
impl SubjectRepository for FakeSubjectDirectory {
    async fn find_subject_by_email(&self, email: &EmailAddress) -> AppResult<Option<Subject>> {
        Ok(self
            .subjects
            .lock()
            .await
            .iter()
            .find(|subject| subject.email() == email)
            .cloned())
    }

    async fn list_subjects(&self, page: PageRequest) -> AppResult<Vec<Subject>> {
        Ok(self
            .subjects
            .lock()
            .await
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn create_subject(&self, subject: NewSubject) -> AppResult<Subject> {
        let mut subjects = self.subjects.lock().await;
        let created = Subject::new(
            SubjectId::from_i64(subjects.len() as i64 + 1),
            subject.email,
            subject.display_name,
            subject.is_active,
            subject.is_superuser,
        );
        subjects.push(created.clone());
        Ok(created)
    }

    async fn set_superuser(
        &self,
        subject_id: SubjectId,
        is_superuser: bool,
    ) -> AppResult<Option<Subject>> {
        let mut subjects = self.subjects.lock().await;
        let Some(stored) = subjects.iter_mut().find(|subject| subject.id() == subject_id) else {
            return Ok(None);
        };
        *stored = Subject::new(
            stored.id(),
            stored.email().clone(),
            stored.display_name().map(str::to_owned),
            stored.is_active(),
            is_superuser,
        );
        Ok(Some(stored.clone()))
    }

    async fn load_subject_with_roles_and_permissions(
        &self,
        subject_id: SubjectId,
    ) -> AppResult<Option<AuthorizationSubject>> {
        Ok(self.hydrate(subject_id).await)
    }

    async fn assign_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        if !self.role_exists(role_id).await {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }
        if !self.subject_exists(subject_id).await {
            return Err(AppError::NotFound(format!(
                "subject '{subject_id}' was not found"
            )));
        }

        self.links.lock().await.insert((subject_id, role_id));
        self.hydrate(subject_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))
    }

    async fn remove_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        if !self.subject_exists(subject_id).await {
            return Err(AppError::NotFound(format!(
                "subject '{subject_id}' was not found"
            )));
        }

        self.links.lock().await.remove(&(subject_id, role_id));
        self.hydrate(subject_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))
    }
}
