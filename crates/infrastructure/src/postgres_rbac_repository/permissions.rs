use super::*;

impl PostgresRbacRepository {
    pub(super) async fn find_permission_impl(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, guard_name
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(permission_from_row)
        .transpose()
    }

    pub(super) async fn find_permission_by_name_impl(
        &self,
        name: &str,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, guard_name
            FROM permissions
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(permission_from_row)
        .transpose()
    }

    pub(super) async fn find_permissions_by_names_impl(
        &self,
        names: &[String],
    ) -> AppResult<Vec<Permission>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, guard_name
            FROM permissions
            WHERE name = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permissions: {error}")))?
        .into_iter()
        .map(permission_from_row)
        .collect()
    }

    pub(super) async fn list_permissions_impl(
        &self,
        page: PageRequest,
    ) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, guard_name
            FROM permissions
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(i64::from(page.offset()))
        .bind(i64::from(page.limit()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?
        .into_iter()
        .map(permission_from_row)
        .collect()
    }

    pub(super) async fn create_permission_impl(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        let guard_name = guard_name_or_default(input.guard_name.as_deref())?;
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (name, description, guard_name)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, guard_name
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(guard_name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_name_conflict(error, "permission", input.name.as_str(), "create permission")
        })?;

        permission_from_row(row)
    }

    pub(super) async fn update_permission_description_impl(
        &self,
        permission_id: PermissionId,
        description: Option<String>,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE permissions
            SET description = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, guard_name
            "#,
        )
        .bind(permission_id.as_i64())
        .bind(description.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update permission: {error}")))?
        .map(permission_from_row)
        .transpose()
    }

    pub(super) async fn delete_permission_impl(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE permission_id = $1
            "#,
        )
        .bind(permission_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to detach permission from roles: {error}"))
        })?;

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(false);
        }

        transaction.commit().await.map_err(commit_error)?;
        Ok(true)
    }
}
