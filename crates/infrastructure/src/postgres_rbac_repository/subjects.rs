use super::*;

impl PostgresRbacRepository {
    pub(super) async fn find_subject_by_email_impl(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<Subject>> {
        sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT id, email, display_name, is_active, is_superuser
            FROM subjects
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find subject: {error}")))?
        .map(subject_from_row)
        .transpose()
    }

    pub(super) async fn list_subjects_impl(&self, page: PageRequest) -> AppResult<Vec<Subject>> {
        sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT id, email, display_name, is_active, is_superuser
            FROM subjects
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(i64::from(page.offset()))
        .bind(i64::from(page.limit()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list subjects: {error}")))?
        .into_iter()
        .map(subject_from_row)
        .collect()
    }

    pub(super) async fn create_subject_impl(&self, subject: NewSubject) -> AppResult<Subject> {
        let row = sqlx::query_as::<_, SubjectRow>(
            r#"
            INSERT INTO subjects (email, display_name, is_active, is_superuser)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, is_active, is_superuser
            "#,
        )
        .bind(subject.email.as_str())
        .bind(subject.display_name.as_deref())
        .bind(subject.is_active)
        .bind(subject.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_name_conflict(error, "subject", subject.email.as_str(), "create subject")
        })?;

        subject_from_row(row)
    }

    pub(super) async fn set_superuser_impl(
        &self,
        subject_id: SubjectId,
        is_superuser: bool,
    ) -> AppResult<Option<Subject>> {
        sqlx::query_as::<_, SubjectRow>(
            r#"
            UPDATE subjects
            SET is_superuser = $2
            WHERE id = $1
            RETURNING id, email, display_name, is_active, is_superuser
            "#,
        )
        .bind(subject_id.as_i64())
        .bind(is_superuser)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update subject: {error}")))?
        .map(subject_from_row)
        .transpose()
    }

    pub(super) async fn assign_role_impl(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM roles
            WHERE id = $1
            FOR SHARE
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        lock_subject(&mut transaction, subject_id).await?;

        sqlx::query(
            r#"
            INSERT INTO subject_roles (subject_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (subject_id, role_id) DO NOTHING
            "#,
        )
        .bind(subject_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        let subject = fetch_authorization_subject(&mut *transaction, subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))?;

        transaction.commit().await.map_err(commit_error)?;
        Ok(subject)
    }

    pub(super) async fn remove_role_impl(
        &self,
        subject_id: SubjectId,
        role_id: RoleId,
    ) -> AppResult<AuthorizationSubject> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        lock_subject(&mut transaction, subject_id).await?;

        sqlx::query(
            r#"
            DELETE FROM subject_roles
            WHERE subject_id = $1 AND role_id = $2
            "#,
        )
        .bind(subject_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove role assignment: {error}"))
        })?;

        let subject = fetch_authorization_subject(&mut *transaction, subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))?;

        transaction.commit().await.map_err(commit_error)?;
        Ok(subject)
    }
}

async fn lock_subject(
    transaction: &mut sqlx::Transaction<'_, Postgres>,
    subject_id: SubjectId,
) -> AppResult<()> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM subjects
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(subject_id.as_i64())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve subject: {error}")))?
    .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' was not found")))?;

    Ok(())
}
