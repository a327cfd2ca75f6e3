use std::sync::Arc;

use rolegate_core::{AppError, SubjectId};
use rolegate_domain::{AccessDecision, AccessRequirement};

use crate::test_support::FakeSubjectDirectory;

use super::AuthorizationService;

async fn admin_directory() -> (Arc<FakeSubjectDirectory>, SubjectId, SubjectId) {
    let directory = Arc::new(FakeSubjectDirectory::default());
    let admin = directory.add_subject("u1@example.com", false).await;
    let plain = directory.add_subject("u2@example.com", false).await;
    let role_id = directory
        .add_role("admin", &["users.view", "users.edit", "users.delete"])
        .await;
    directory.links.lock().await.insert((admin, role_id));
    (directory, admin, plain)
}

#[tokio::test]
async fn require_permission_allows_subject_with_granting_role() {
    let (directory, admin, _) = admin_directory().await;
    let service = AuthorizationService::new(directory);

    let subject = service.require_permission(Some(admin), "users.edit").await;
    assert!(subject.is_ok());
    assert!(service.require_role(Some(admin), "admin").await.is_ok());
}

#[tokio::test]
async fn require_permission_forbids_subject_without_roles() {
    let (directory, _, plain) = admin_directory().await;
    let service = AuthorizationService::new(directory);

    let result = service.require_permission(Some(plain), "users.view").await;
    assert!(
        matches!(result, Err(AppError::Forbidden(message)) if message.contains("users.view"))
    );
    assert!(matches!(
        service.require_role(Some(plain), "admin").await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn missing_or_unknown_subject_is_unauthorized() {
    let (directory, _, _) = admin_directory().await;
    let service = AuthorizationService::new(directory);

    assert!(matches!(
        service.require_permission(None, "users.view").await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        service
            .require_permission(Some(SubjectId::from_i64(404)), "users.view")
            .await,
        Err(AppError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn superuser_passes_every_check() {
    let directory = Arc::new(FakeSubjectDirectory::default());
    let root = directory.add_subject("root@example.com", true).await;
    let service = AuthorizationService::new(directory);

    assert!(
        service
            .require_permission(Some(root), "anything.at.all")
            .await
            .is_ok()
    );
    assert!(service.require_role(Some(root), "nonexistent").await.is_ok());
}

#[tokio::test]
async fn boolean_checks_report_without_failing() {
    let (directory, admin, plain) = admin_directory().await;
    let service = AuthorizationService::new(directory);

    assert_eq!(service.has_permission(Some(admin), "users.delete").await.ok(), Some(true));
    assert_eq!(service.has_permission(Some(plain), "users.delete").await.ok(), Some(false));
    assert_eq!(service.has_role(None, "admin").await.ok(), Some(false));
}

#[tokio::test]
async fn evaluate_subject_access_reports_decision_for_existing_subject() {
    let (directory, admin, plain) = admin_directory().await;
    let service = AuthorizationService::new(directory);
    let requirement = AccessRequirement::permission("users.edit");

    assert_eq!(
        service.evaluate_subject_access(admin, &requirement).await.ok(),
        Some(AccessDecision::Allowed)
    );
    assert_eq!(
        service.evaluate_subject_access(plain, &requirement).await.ok(),
        Some(AccessDecision::Denied)
    );
    assert!(matches!(
        service
            .evaluate_subject_access(SubjectId::from_i64(99), &requirement)
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn role_changes_are_visible_to_the_next_check() {
    let (directory, admin, _) = admin_directory().await;
    let service = AuthorizationService::new(directory.clone());

    assert!(service.require_permission(Some(admin), "users.view").await.is_ok());
    directory.links.lock().await.clear();
    assert!(matches!(
        service.require_permission(Some(admin), "users.view").await,
        Err(AppError::Forbidden(_))
    ));
}
