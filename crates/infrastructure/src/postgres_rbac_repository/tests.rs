use chrono::Utc;
use rolegate_application::{
    CreatePermissionInput, CreateRoleInput, NewSubject, PermissionRepository, RoleRepository,
    SubjectRepository, UpdateRoleInput,
};
use rolegate_core::{AppError, RoleId, SubjectId};
use rolegate_domain::EmailAddress;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresRbacRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres rbac tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

async fn create_permission(repository: &PostgresRbacRepository, name: &str) {
    let created = repository
        .create_permission(CreatePermissionInput {
            name: name.to_owned(),
            description: None,
            guard_name: None,
        })
        .await;
    assert!(created.is_ok());
}

async fn create_subject(repository: &PostgresRbacRepository, local_part: &str) -> SubjectId {
    let email = EmailAddress::new(format!("{}@example.com", unique(local_part)))
        .unwrap_or_else(|_| unreachable!());
    repository
        .create_subject(NewSubject {
            email,
            display_name: None,
            is_active: true,
            is_superuser: false,
        })
        .await
        .unwrap_or_else(|_| unreachable!())
        .id()
}

#[tokio::test]
async fn create_role_links_only_known_permissions() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let view = unique("users.view");
    create_permission(&repository, view.as_str()).await;

    let role = repository
        .create_role(CreateRoleInput {
            name: unique("viewer"),
            description: Some("read only".to_owned()),
            guard_name: None,
            permission_names: vec![view.clone(), unique("missing")],
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(role.guard_name(), "web");
    assert_eq!(role.permissions().len(), 1);
    assert!(role.grants(view.as_str()));
}

#[tokio::test]
async fn duplicate_role_name_maps_to_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let name = unique("auditor");
    let input = CreateRoleInput {
        name: name.clone(),
        description: None,
        guard_name: None,
        permission_names: Vec::new(),
    };

    assert!(repository.create_role(input.clone()).await.is_ok());
    assert!(matches!(
        repository.create_role(input).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn update_role_replaces_permissions_and_rejects_taken_name() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let first = unique("a.read");
    let second = unique("c.read");
    create_permission(&repository, first.as_str()).await;
    create_permission(&repository, second.as_str()).await;

    let taken = unique("taken");
    assert!(
        repository
            .create_role(CreateRoleInput {
                name: taken.clone(),
                description: None,
                guard_name: None,
                permission_names: Vec::new(),
            })
            .await
            .is_ok()
    );
    let role_name = unique("ops");
    let role = repository
        .create_role(CreateRoleInput {
            name: role_name.clone(),
            description: None,
            guard_name: None,
            permission_names: vec![first],
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    let updated = repository
        .update_role(
            role.id(),
            UpdateRoleInput {
                name: role_name.clone(),
                description: None,
                permission_names: Some(vec![second.clone()]),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert_eq!(updated.permissions().len(), 1);
    assert!(updated.grants(second.as_str()));

    let renamed = repository
        .update_role(
            role.id(),
            UpdateRoleInput {
                name: taken,
                description: None,
                permission_names: None,
            },
        )
        .await;
    assert!(matches!(renamed, Err(AppError::Conflict(_))));

    let missing = repository
        .update_role(
            RoleId::from_i64(i64::MAX),
            UpdateRoleInput {
                name: unique("ghost"),
                description: None,
                permission_names: None,
            },
        )
        .await;
    assert!(matches!(missing, Ok(None)));
}

#[tokio::test]
async fn assignments_hydrate_subject_and_cascade_on_role_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let permission = unique("users.edit");
    create_permission(&repository, permission.as_str()).await;
    let role = repository
        .create_role(CreateRoleInput {
            name: unique("editor"),
            description: None,
            guard_name: None,
            permission_names: vec![permission.clone()],
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    let subject_id = create_subject(&repository, "alice").await;

    let first = repository.assign_role(subject_id, role.id()).await;
    let second = repository.assign_role(subject_id, role.id()).await;
    assert!(first.is_ok());
    let hydrated = second.unwrap_or_else(|_| unreachable!());
    assert_eq!(hydrated.roles().len(), 1);
    assert_eq!(hydrated.permission_names(), vec![permission.as_str()]);

    let assignments = repository
        .list_role_assignments(role.id())
        .await
        .unwrap_or_default();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].subject_id, subject_id);

    assert_eq!(repository.delete_role(role.id()).await.ok(), Some(true));
    let after = repository
        .load_subject_with_roles_and_permissions(subject_id)
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert!(after.roles().is_empty());
    assert!(matches!(
        repository.find_permission_by_name(permission.as_str()).await,
        Ok(Some(_))
    ));
}

#[tokio::test]
async fn assign_role_reports_missing_role_before_missing_subject() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let subject_id = create_subject(&repository, "bob").await;

    let missing_role = repository
        .assign_role(subject_id, RoleId::from_i64(i64::MAX))
        .await;
    assert!(
        matches!(missing_role, Err(AppError::NotFound(message)) if message.starts_with("role"))
    );

    let removed = repository
        .remove_role(subject_id, RoleId::from_i64(i64::MAX))
        .await;
    assert!(removed.is_ok());
}

#[tokio::test]
async fn duplicate_subject_email_maps_to_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let email = EmailAddress::new(format!("{}@example.com", unique("carol")))
        .unwrap_or_else(|_| unreachable!());
    let subject = NewSubject {
        email,
        display_name: Some("Carol".to_owned()),
        is_active: true,
        is_superuser: false,
    };

    assert!(repository.create_subject(subject.clone()).await.is_ok());
    assert!(matches!(
        repository.create_subject(subject).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn blank_guard_is_rejected_before_insert() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let role_name = unique("guarded");
    let permission_name = unique("guarded.view");

    let role = repository
        .create_role(CreateRoleInput {
            name: role_name.clone(),
            description: None,
            guard_name: Some(" ".to_owned()),
            permission_names: Vec::new(),
        })
        .await;
    assert!(matches!(role, Err(AppError::Validation(_))));

    let permission = repository
        .create_permission(CreatePermissionInput {
            name: permission_name.clone(),
            description: None,
            guard_name: Some(String::new()),
        })
        .await;
    assert!(matches!(permission, Err(AppError::Validation(_))));

    let stored_role = repository
        .find_role_by_name(role_name.as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    let stored_permission = repository
        .find_permission_by_name(permission_name.as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(stored_role.is_none());
    assert!(stored_permission.is_none());
}
