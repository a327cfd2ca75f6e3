use async_trait::async_trait;

use rolegate_core::{AppResult, PageRequest, PermissionId, RoleId, SubjectId};
use rolegate_domain::{AuthorizationSubject, EmailAddress, Permission, Role, Subject};

use super::permissions::CreatePermissionInput;
use super::roles::{CreateRoleInput, RoleAssignment, UpdateRoleInput};
use super::subjects::NewSubject;

/// Store port for roles and their permission links.
///
/// Every mutating method runs as one atomic unit. A failure leaves no partial
/// state visible to readers.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role with its permissions by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role with its permissions by exact name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Lists a page of roles ordered by id.
    async fn list_roles(&self, page: PageRequest) -> AppResult<Vec<Role>>;

    /// Creates a role and links every permission whose name resolves.
    ///
    /// Fails with `Conflict` when the name is taken.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role>;

    /// Overwrites the name, optionally the description, and optionally
    /// replaces the permission set. Returns `None` when the role is missing.
    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput)
    -> AppResult<Option<Role>>;

    /// Removes the role together with every permission and subject link.
    /// Returns `false` when the role is missing.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool>;

    /// Lists subjects currently holding the role, ordered by subject id.
    async fn list_role_assignments(&self, role_id: RoleId) -> AppResult<Vec<RoleAssignment>>;
}

/// Store port for permissions.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds a permission by id.
    async fn find_permission(&self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Finds a permission by exact name.
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Returns the permissions whose names appear in `names`. Unknown names
    /// are skipped.
    async fn find_permissions_by_names(&self, names: &[String]) -> AppResult<Vec<Permission>>;

    /// Lists a page of permissions ordered by id.
    async fn list_permissions(&self, page: PageRequest) -> AppResult<Vec<Permission>>;

    /// Creates a permission. Fails with `Conflict` when the name is taken.
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission>;

    /// Replaces the description. Returns `None` when the permission is missing.
    async fn update_permission_description(
        &self,
        permission_id: PermissionId,
        description: Option<String>,
    ) -> AppResult<Option<Permission>>;

    /// Removes the permission and detaches it from every role.
    /// Returns `false` when the permission is missing.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<bool>;
}

/// Store port for subjects and their role links.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Finds a subject by email.
    async fn find_subject_by_email(&self, email: &EmailAddress) -> AppResult<Option<Subject>>;

    /// Lists a page of subjects ordered by id.
    async fn list_subjects(&self, page: PageRequest) -> AppResult<Vec<Subject>>;

    /// Creates a subject. Fails with `Conflict` when the email is taken.
    async fn create_subject(&self, subject: NewSubject) -> AppResult<Subject>;

    /// Sets the superuser flag. Returns `None` when the subject is missing.
    async fn set_superuser(
        &self,
        subject_id: SubjectId,
        is_superuser: bool,
    ) -> AppResult<Option<Subject>>;

    /// Loads the subject with its roles and each role's permissions in one read.
    async fn load_subject_with_roles_and_permissions(
        &self,
        subject_id: SubjectId,
    ) -> AppResult<Option<AuthorizationSubject>>;

    /// Adds the role to the subject unless already held.
    ///
    /// Resolves the role first, then the subject; either missing fails with
    /// `NotFound` and nothing is written.
    async fn assign_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject>;

    /// Removes the role from the subject if held. A role that is not held is a
    /// successful no-op. Fails with `NotFound` only when the subject is missing.
    async fn remove_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject>;
}
