use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::RwLock;

use rolegate_application::{
    CreatePermissionInput, CreateRoleInput, NewSubject, PermissionRepository, RoleAssignment,
    RoleRepository, SubjectRepository, UpdateRoleInput,
};
use rolegate_core::{AppError, AppResult, PageRequest, PermissionId, RoleId, SubjectId};
use rolegate_domain::{AuthorizationSubject, EmailAddress, Permission, Role, Subject};


/// In-memory store implementation.
///
/// All tables sit behind one lock, so every operation observes and produces a
/// consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    state: RwLock<RbacState>,
}

impl InMemoryRbacRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
struct RoleRecord {
    name: String,
    description: Option<String>,
    guard_name: Option<String>,
}

#[derive(Debug, Default)]
struct RbacState {
    last_subject_id: i64,
    last_role_id: i64,
    last_permission_id: i64,
    subjects: BTreeMap<SubjectId, Subject>,
    roles: BTreeMap<RoleId, RoleRecord>,
    permissions: BTreeMap<PermissionId, Permission>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    subject_roles: BTreeMap<(SubjectId, RoleId), DateTime<Utc>>,
}

impl RbacState {
    fn role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let Some(record) = self.roles.get(&role_id) else {
            return Ok(None);
        };

        let permissions = self
            .role_permissions
            .iter()
            .filter(|(linked_role_id, _)| *linked_role_id == role_id)
            .filter_map(|(_, permission_id)| self.permissions.get(permission_id).cloned())
            .collect();

        Role::new(
            role_id,
            record.name.clone(),
            record.description.clone(),
            record.guard_name.clone(),
            permissions,
        )
        .map(Some)
    }

    fn role_id_by_name(&self, name: &str) -> Option<RoleId> {
        self.roles
            .iter()
            .find_map(|(role_id, record)| (record.name == name).then_some(*role_id))
    }

    fn authorization_subject(
        &self,
        subject_id: SubjectId,
    ) -> AppResult<Option<AuthorizationSubject>> {
        let Some(subject) = self.subjects.get(&subject_id) else {
            return Ok(None);
        };

        let mut roles = Vec::new();
        for (linked_subject_id, role_id) in self.subject_roles.keys() {
            if *linked_subject_id != subject_id {
                continue;
            }
            if let Some(role) = self.role(*role_id)? {
                roles.push(role);
            }
        }

        Ok(Some(AuthorizationSubject::new(subject.clone(), roles)))
    }

    fn permission_ids_by_names(&self, names: &[String]) -> Vec<PermissionId> {
        self.permissions
            .values()
            .filter(|permission| names.iter().any(|name| name == permission.name()))
            .map(Permission::id)
            .collect()
    }

    fn link_permissions(&mut self, role_id: RoleId, names: &[String]) {
        for permission_id in self.permission_ids_by_names(names) {
            self.role_permissions.insert((role_id, permission_id));
        }
    }
}

fn page_of<T>(values: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    values
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

fn role_not_found(role_id: RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' was not found"))
}

fn subject_not_found(subject_id: SubjectId) -> AppError {
    AppError::NotFound(format!("subject '{subject_id}' was not found"))
}

#[async_trait]
impl RoleRepository for InMemoryRbacRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.state.read().await.role(role_id)
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        match state.role_id_by_name(name) {
            Some(role_id) => state.role(role_id),
            None => Ok(None),
        }
    }

    async fn list_roles(&self, page: PageRequest) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        page_of(state.roles.keys().copied(), page)
            .into_iter()
            .filter_map(|role_id| state.role(role_id).transpose())
            .collect()
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let mut state = self.state.write().await;

        if state.role_id_by_name(input.name.as_str()).is_some() {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let role_id = RoleId::from_i64(state.last_role_id + 1);
        let record = RoleRecord {
            name: input.name,
            description: input.description,
            guard_name: input.guard_name,
        };

        // Validate before mutating state.
        Role::new(
            role_id,
            record.name.clone(),
            record.description.clone(),
            record.guard_name.clone(),
            Vec::new(),
        )?;

        state.last_role_id = role_id.as_i64();
        state.roles.insert(role_id, record);
        state.link_permissions(role_id, &input.permission_names);

        state
            .role(role_id)?
            .ok_or_else(|| AppError::Internal(format!("created role '{role_id}' vanished")))
    }

    async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Option<Role>> {
        let mut state = self.state.write().await;

        let Some(current) = state.roles.get(&role_id).cloned() else {
            return Ok(None);
        };

        if state
            .role_id_by_name(input.name.as_str())
            .is_some_and(|existing| existing != role_id)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let record = RoleRecord {
            name: input.name,
            description: input.description.or(current.description),
            guard_name: current.guard_name,
        };

        Role::new(
            role_id,
            record.name.clone(),
            record.description.clone(),
            record.guard_name.clone(),
            Vec::new(),
        )?;

        state.roles.insert(role_id, record);

        if let Some(permission_names) = &input.permission_names {
            state
                .role_permissions
                .retain(|(linked_role_id, _)| *linked_role_id != role_id);
            state.link_permissions(role_id, permission_names);
        }

        state.role(role_id)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.write().await;

        if state.roles.remove(&role_id).is_none() {
            return Ok(false);
        }

        state
            .role_permissions
            .retain(|(linked_role_id, _)| *linked_role_id != role_id);
        state
            .subject_roles
            .retain(|(_, linked_role_id), _| *linked_role_id != role_id);
        Ok(true)
    }

    async fn list_role_assignments(&self, role_id: RoleId) -> AppResult<Vec<RoleAssignment>> {
        let state = self.state.read().await;

        Ok(state
            .subject_roles
            .iter()
            .filter(|((_, linked_role_id), _)| *linked_role_id == role_id)
            .filter_map(|((subject_id, _), assigned_at)| {
                state.subjects.get(subject_id).map(|subject| RoleAssignment {
                    subject_id: *subject_id,
                    email: subject.email().as_str().to_owned(),
                    assigned_at: assigned_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                })
            })
            .collect())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.state.read().await.permissions.get(&permission_id).cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.name() == name)
            .cloned())
    }

    async fn find_permissions_by_names(&self, names: &[String]) -> AppResult<Vec<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .filter(|permission| names.iter().any(|name| name == permission.name()))
            .cloned()
            .collect())
    }

    async fn list_permissions(&self, page: PageRequest) -> AppResult<Vec<Permission>> {
        Ok(page_of(
            self.state.read().await.permissions.values().cloned(),
            page,
        ))
    }

    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let mut state = self.state.write().await;

        if state
            .permissions
            .values()
            .any(|permission| permission.name() == input.name)
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.name
            )));
        }

        let permission = Permission::new(
            PermissionId::from_i64(state.last_permission_id + 1),
            input.name,
            input.description,
            input.guard_name,
        )?;

        state.last_permission_id = permission.id().as_i64();
        state
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn update_permission_description(
        &self,
        permission_id: PermissionId,
        description: Option<String>,
    ) -> AppResult<Option<Permission>> {
        let mut state = self.state.write().await;

        let Some(current) = state.permissions.get(&permission_id) else {
            return Ok(None);
        };

        let updated = Permission::new(
            permission_id,
            current.name(),
            description,
            Some(current.guard_name().to_owned()),
        )?;
        state.permissions.insert(permission_id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<bool> {
        let mut state = self.state.write().await;

        if state.permissions.remove(&permission_id).is_none() {
            return Ok(false);
        }

        state
            .role_permissions
            .retain(|(_, linked_permission_id)| *linked_permission_id != permission_id);
        Ok(true)
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRbacRepository {
    async fn find_subject_by_email(&self, email: &EmailAddress) -> AppResult<Option<Subject>> {
        Ok(self
            .state
            .read()
            .await
            .subjects
            .values()
            .find(|subject| subject.email() == email)
            .cloned())
    }

    async fn list_subjects(&self, page: PageRequest) -> AppResult<Vec<Subject>> {
        Ok(page_of(
            self.state.read().await.subjects.values().cloned(),
            page,
        ))
    }

    async fn create_subject(&self, subject: NewSubject) -> AppResult<Subject> {
        let mut state = self.state.write().await;

        if state
            .subjects
            .values()
            .any(|existing| existing.email() == &subject.email)
        {
            return Err(AppError::Conflict(format!(
                "subject '{}' already exists",
                subject.email.as_str()
            )));
        }

        let subject_id = SubjectId::from_i64(state.last_subject_id + 1);
        let created = Subject::new(
            subject_id,
            subject.email,
            subject.display_name,
            subject.is_active,
            subject.is_superuser,
        );

        state.last_subject_id = subject_id.as_i64();
        state.subjects.insert(subject_id, created.clone());
        Ok(created)
    }

    async fn set_superuser(
        &self,
        subject_id: SubjectId,
        is_superuser: bool,
    ) -> AppResult<Option<Subject>> {
        let mut state = self.state.write().await;

        let Some(current) = state.subjects.get(&subject_id) else {
            return Ok(None);
        };

        let updated = Subject::new(
            subject_id,
            current.email().clone(),
            current.display_name().map(str::to_owned),
            current.is_active(),
            is_superuser,
        );
        state.subjects.insert(subject_id, updated.clone());
        Ok(Some(updated))
    }

    async fn load_subject_with_roles_and_permissions(
        &self,
        subject_id: SubjectId,
    ) -> AppResult<Option<AuthorizationSubject>> {
        self.state.read().await.authorization_subject(subject_id)
    }

    async fn assign_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&role_id) {
            return Err(role_not_found(role_id));
        }
        if !state.subjects.contains_key(&subject_id) {
            return Err(subject_not_found(subject_id));
        }

        state
            .subject_roles
            .entry((subject_id, role_id))
            .or_insert_with(Utc::now);

        state
            .authorization_subject(subject_id)?
            .ok_or_else(|| subject_not_found(subject_id))
    }

    async fn remove_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        let mut state = self.state.write().await;

        if !state.subjects.contains_key(&subject_id) {
            return Err(subject_not_found(subject_id));
        }

        state.subject_roles.remove(&(subject_id, role_id));

        state
            .authorization_subject(subject_id)?
            .ok_or_else(|| subject_not_found(subject_id))
    }
}
