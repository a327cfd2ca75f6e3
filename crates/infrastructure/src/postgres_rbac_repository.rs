use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres};

use rolegate_application::{
    CreatePermissionInput, CreateRoleInput, NewSubject, PermissionRepository, RoleAssignment,
    RoleRepository, SubjectRepository, UpdateRoleInput,
};
use rolegate_core::{AppError, AppResult, PageRequest, PermissionId, RoleId, SubjectId};
use rolegate_domain::{
    AuthorizationSubject, EmailAddress, Permission, Role, Subject, normalize_guard_name,
};

mod permissions;
mod roles;
mod subjects;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed store for subjects, roles and permissions.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    name: String,
    description: Option<String>,
    guard_name: String,
}

#[derive(Debug, FromRow)]
struct SubjectRow {
    id: i64,
    email: String,
    display_name: Option<String>,
    is_active: bool,
    is_superuser: bool,
}

/// One role joined with at most one of its permissions.
#[derive(Debug, FromRow)]
struct RoleGrantRow {
    role_id: Option<i64>,
    role_name: Option<String>,
    role_description: Option<String>,
    role_guard_name: Option<String>,
    permission_id: Option<i64>,
    permission_name: Option<String>,
    permission_description: Option<String>,
    permission_guard_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct SubjectGrantRow {
    subject_id: i64,
    email: String,
    display_name: Option<String>,
    is_active: bool,
    is_superuser: bool,
    #[sqlx(flatten)]
    grant: RoleGrantRow,
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    subject_id: i64,
    email: String,
    assigned_at: String,
}

#[async_trait]
impl RoleRepository for PostgresRbacRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(fetch_roles(&self.pool, &[role_id.as_i64()]).await?.pop())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.find_role_by_name_impl(name).await
    }

    async fn list_roles(&self, page: PageRequest) -> AppResult<Vec<Role>> {
        self.list_roles_impl(page).await
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        self.create_role_impl(input).await
    }

    async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Option<Role>> {
        self.update_role_impl(role_id, input).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        self.delete_role_impl(role_id).await
    }

    async fn list_role_assignments(&self, role_id: RoleId) -> AppResult<Vec<RoleAssignment>> {
        self.list_role_assignments_impl(role_id).await
    }
}

#[async_trait]
impl PermissionRepository for PostgresRbacRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        self.find_permission_impl(permission_id).await
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        self.find_permission_by_name_impl(name).await
    }

    async fn find_permissions_by_names(&self, names: &[String]) -> AppResult<Vec<Permission>> {
        self.find_permissions_by_names_impl(names).await
    }

    async fn list_permissions(&self, page: PageRequest) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl(page).await
    }

    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        self.create_permission_impl(input).await
    }

    async fn update_permission_description(
        &self,
        permission_id: PermissionId,
        description: Option<String>,
    ) -> AppResult<Option<Permission>> {
        self.update_permission_description_impl(permission_id, description)
            .await
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<bool> {
        self.delete_permission_impl(permission_id).await
    }
}

#[async_trait]
impl SubjectRepository for PostgresRbacRepository {
    async fn find_subject_by_email(&self, email: &EmailAddress) -> AppResult<Option<Subject>> {
        self.find_subject_by_email_impl(email).await
    }

    async fn list_subjects(&self, page: PageRequest) -> AppResult<Vec<Subject>> {
        self.list_subjects_impl(page).await
    }

    async fn create_subject(&self, subject: NewSubject) -> AppResult<Subject> {
        self.create_subject_impl(subject).await
    }

    async fn set_superuser(
        &self,
        subject_id: SubjectId,
        is_superuser: bool,
    ) -> AppResult<Option<Subject>> {
        self.set_superuser_impl(subject_id, is_superuser).await
    }

    async fn load_subject_with_roles_and_permissions(
        &self,
        subject_id: SubjectId,
    ) -> AppResult<Option<AuthorizationSubject>> {
        fetch_authorization_subject(&self.pool, subject_id).await
    }

    async fn assign_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        self.assign_role_impl(subject_id, role_id).await
    }

    async fn remove_role(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        self.remove_role_impl(subject_id, role_id).await
    }
}

/// Loads roles with their permissions, ordered by role id.
async fn fetch_roles<'e, E>(executor: E, role_ids: &[i64]) -> AppResult<Vec<Role>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, RoleGrantRow>(
        r#"
        SELECT
            roles.id AS role_id,
            roles.name AS role_name,
            roles.description AS role_description,
            roles.guard_name AS role_guard_name,
            permissions.id AS permission_id,
            permissions.name AS permission_name,
            permissions.description AS permission_description,
            permissions.guard_name AS permission_guard_name
        FROM roles
        LEFT JOIN role_permissions
            ON role_permissions.role_id = roles.id
        LEFT JOIN permissions
            ON permissions.id = role_permissions.permission_id
        WHERE roles.id = ANY($1)
        ORDER BY roles.id, permissions.id
        "#,
    )
    .bind(role_ids)
    .fetch_all(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load roles: {error}")))?;

    aggregate_roles(rows)
}

/// Loads a subject, its roles and every role's permissions in one statement.
async fn fetch_authorization_subject<'e, E>(
    executor: E,
    subject_id: SubjectId,
) -> AppResult<Option<AuthorizationSubject>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, SubjectGrantRow>(
        r#"
        SELECT
            subjects.id AS subject_id,
            subjects.email,
            subjects.display_name,
            subjects.is_active,
            subjects.is_superuser,
            roles.id AS role_id,
            roles.name AS role_name,
            roles.description AS role_description,
            roles.guard_name AS role_guard_name,
            permissions.id AS permission_id,
            permissions.name AS permission_name,
            permissions.description AS permission_description,
            permissions.guard_name AS permission_guard_name
        FROM subjects
        LEFT JOIN subject_roles
            ON subject_roles.subject_id = subjects.id
        LEFT JOIN roles
            ON roles.id = subject_roles.role_id
        LEFT JOIN role_permissions
            ON role_permissions.role_id = roles.id
        LEFT JOIN permissions
            ON permissions.id = role_permissions.permission_id
        WHERE subjects.id = $1
        ORDER BY roles.id, permissions.id
        "#,
    )
    .bind(subject_id.as_i64())
    .fetch_all(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load subject grants: {error}")))?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let subject = subject_from_row(SubjectRow {
        id: first.subject_id,
        email: first.email.clone(),
        display_name: first.display_name.clone(),
        is_active: first.is_active,
        is_superuser: first.is_superuser,
    })?;
    let roles = aggregate_roles(rows.into_iter().map(|row| row.grant))?;

    Ok(Some(AuthorizationSubject::new(subject, roles)))
}

fn aggregate_roles(rows: impl IntoIterator<Item = RoleGrantRow>) -> AppResult<Vec<Role>> {
    let mut grouped: BTreeMap<i64, (RoleGrantRow, Vec<Permission>)> = BTreeMap::new();

    for mut row in rows {
        let Some(role_id) = row.role_id else {
            continue;
        };

        let permission = match (row.permission_id.take(), row.permission_name.take()) {
            (Some(permission_id), Some(permission_name)) => Some(Permission::new(
                PermissionId::from_i64(permission_id),
                permission_name,
                row.permission_description.take(),
                row.permission_guard_name.take(),
            )?),
            _ => None,
        };

        let entry = grouped
            .entry(role_id)
            .or_insert_with(|| (row, Vec::new()));
        entry.1.extend(permission);
    }

    grouped
        .into_iter()
        .map(|(role_id, (row, permissions))| {
            Role::new(
                RoleId::from_i64(role_id),
                row.role_name.unwrap_or_default(),
                row.role_description,
                row.role_guard_name,
                permissions,
            )
        })
        .collect()
}

fn permission_from_row(row: PermissionRow) -> AppResult<Permission> {
    Permission::new(
        PermissionId::from_i64(row.id),
        row.name,
        row.description,
        Some(row.guard_name),
    )
}

fn subject_from_row(row: SubjectRow) -> AppResult<Subject> {
    Ok(Subject::new(
        SubjectId::from_i64(row.id),
        EmailAddress::new(row.email)?,
        row.display_name,
        row.is_active,
        row.is_superuser,
    ))
}

fn guard_name_or_default(guard_name: Option<&str>) -> AppResult<String> {
    normalize_guard_name(guard_name.map(str::to_owned)).map(String::from)
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

fn map_name_conflict(error: sqlx::Error, kind: &str, name: &str, action: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!("{kind} '{name}' already exists"));
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

fn begin_error(error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to begin transaction: {error}"))
}

fn commit_error(error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to commit transaction: {error}"))
}
