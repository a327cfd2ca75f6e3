use super::*;

impl PostgresRbacRepository {
    pub(super) async fn find_role_by_name_impl(&self, name: &str) -> AppResult<Option<Role>> {
        let role_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        match role_id {
            Some(role_id) => Ok(fetch_roles(&self.pool, &[role_id]).await?.pop()),
            None => Ok(None),
        }
    }

    pub(super) async fn list_roles_impl(&self, page: PageRequest) -> AppResult<Vec<Role>> {
        let role_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM roles
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(i64::from(page.offset()))
        .bind(i64::from(page.limit()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        fetch_roles(&self.pool, &role_ids).await
    }

    pub(super) async fn create_role_impl(&self, input: CreateRoleInput) -> AppResult<Role> {
        let guard_name = guard_name_or_default(input.guard_name.as_deref())?;
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let role_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO roles (name, description, guard_name)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(guard_name.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_name_conflict(error, "role", input.name.as_str(), "create role"))?;

        link_permissions(&mut transaction, role_id, &input.permission_names).await?;

        let role = fetch_roles(&mut *transaction, &[role_id])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("created role '{role_id}' vanished")))?;

        transaction.commit().await.map_err(commit_error)?;
        Ok(role)
    }

    pub(super) async fn update_role_impl(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Option<Role>> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2,
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_name_conflict(error, "role", input.name.as_str(), "update role"))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }

        if let Some(permission_names) = &input.permission_names {
            sqlx::query(
                r#"
                DELETE FROM role_permissions
                WHERE role_id = $1
                "#,
            )
            .bind(role_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear role permissions: {error}"))
            })?;

            link_permissions(&mut transaction, role_id.as_i64(), permission_names).await?;
        }

        let role = fetch_roles(&mut *transaction, &[role_id.as_i64()])
            .await?
            .pop();

        transaction.commit().await.map_err(commit_error)?;
        Ok(role)
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<bool> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach role permissions: {error}")))?;

        sqlx::query(
            r#"
            DELETE FROM subject_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach role subjects: {error}")))?;

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(false);
        }

        transaction.commit().await.map_err(commit_error)?;
        Ok(true)
    }

    pub(super) async fn list_role_assignments_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                subjects.id AS subject_id,
                subjects.email,
                to_char(subject_roles.assigned_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS assigned_at
            FROM subject_roles
            INNER JOIN subjects
                ON subjects.id = subject_roles.subject_id
            WHERE subject_roles.role_id = $1
            ORDER BY subjects.id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| RoleAssignment {
                subject_id: SubjectId::from_i64(row.subject_id),
                email: row.email,
                assigned_at: row.assigned_at,
            })
            .collect())
    }
}

/// Links every permission whose name resolves. Unknown names are skipped.
async fn link_permissions(
    transaction: &mut sqlx::Transaction<'_, Postgres>,
    role_id: i64,
    permission_names: &[String],
) -> AppResult<()> {
    if permission_names.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, permissions.id
        FROM permissions
        WHERE permissions.name = ANY($2)
        ON CONFLICT (role_id, permission_id) DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(permission_names)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to persist role permissions: {error}")))?;

    Ok(())
}
