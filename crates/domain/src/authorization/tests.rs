use std::collections::BTreeSet;

use proptest::prelude::*;
use rolegate_core::{PermissionId, RoleId, SubjectId};

use super::{
    AccessDecision, AccessRequirement, AuthorizationSubject, evaluate_permission, has_permission,
    has_role,
};
use crate::{EmailAddress, Permission, Role, Subject};

fn subject(is_superuser: bool) -> Subject {
    Subject::new(
        SubjectId::from_i64(1),
        EmailAddress::new("u1@example.com").unwrap_or_else(|_| unreachable!()),
        None,
        true,
        is_superuser,
    )
}

fn permission(id: i64, name: &str) -> Permission {
    Permission::new(PermissionId::from_i64(id), name, None, None).unwrap_or_else(|_| unreachable!())
}

fn role(id: i64, name: &str, permissions: Vec<Permission>) -> Role {
    Role::new(RoleId::from_i64(id), name, None, None, permissions)
        .unwrap_or_else(|_| unreachable!())
}

fn admin_subject() -> AuthorizationSubject {
    AuthorizationSubject::new(
        subject(false),
        vec![role(
            1,
            "admin",
            vec![
                permission(1, "users.view"),
                permission(2, "users.edit"),
                permission(3, "users.delete"),
            ],
        )],
    )
}

#[test]
fn absent_subject_is_unauthenticated() {
    assert_eq!(
        evaluate_permission(None, "users.edit"),
        AccessDecision::Unauthenticated
    );
    assert!(!has_permission(None, "users.edit"));
    assert!(!has_role(None, "admin"));
}

#[test]
fn role_permission_grants_access() {
    let subject = admin_subject();
    assert!(has_permission(Some(&subject), "users.edit"));
    assert!(!has_permission(Some(&subject), "users.create"));
    assert!(has_role(Some(&subject), "admin"));
    assert!(!has_role(Some(&subject), "Admin"));
}

#[test]
fn subject_without_roles_is_denied_everything() {
    let subject = AuthorizationSubject::new(subject(false), Vec::new());
    assert_eq!(
        evaluate_permission(Some(&subject), "users.view"),
        AccessDecision::Denied
    );
    assert!(!has_role(Some(&subject), "admin"));
}

#[test]
fn requirement_dispatches_to_matching_evaluator() {
    let subject = admin_subject();
    assert!(
        AccessRequirement::role("admin")
            .evaluate(Some(&subject))
            .is_allowed()
    );
    assert_eq!(
        AccessRequirement::permission("reports.view").evaluate(Some(&subject)),
        AccessDecision::Denied
    );
}

#[test]
fn permission_names_are_distinct_across_roles() {
    let subject = AuthorizationSubject::new(
        subject(false),
        vec![
            role(1, "viewer", vec![permission(1, "users.view")]),
            role(
                2,
                "editor",
                vec![permission(1, "users.view"), permission(2, "users.edit")],
            ),
        ],
    );
    assert_eq!(subject.permission_names(), vec!["users.edit", "users.view"]);
}

fn permission_name(index: u8) -> String {
    format!("resource{index}.action")
}

prop_compose! {
    fn role_graph()(
        roles in prop::collection::vec(prop::collection::btree_set(0u8..12, 0..6), 0..6),
        held in prop::collection::btree_set(0usize..6, 0..6),
        query in 0u8..14,
    ) -> (Vec<BTreeSet<u8>>, BTreeSet<usize>, u8) {
        (roles, held, query)
    }
}

fn hydrate(
    roles: &[BTreeSet<u8>],
    held: &BTreeSet<usize>,
    is_superuser: bool,
) -> AuthorizationSubject {
    let held_roles = roles
        .iter()
        .enumerate()
        .filter(|(index, _)| held.contains(index))
        .map(|(index, permissions)| {
            role(
                index as i64 + 1,
                format!("role{index}").as_str(),
                permissions
                    .iter()
                    .map(|permission_index| {
                        permission(
                            i64::from(*permission_index) + 1,
                            permission_name(*permission_index).as_str(),
                        )
                    })
                    .collect(),
            )
        })
        .collect();

    AuthorizationSubject::new(subject(is_superuser), held_roles)
}

proptest! {
    #[test]
    fn permission_allowed_iff_some_held_role_carries_it((roles, held, query) in role_graph()) {
        let subject = hydrate(&roles, &held, false);
        let expected = roles
            .iter()
            .enumerate()
            .any(|(index, permissions)| held.contains(&index) && permissions.contains(&query));

        prop_assert_eq!(
            has_permission(Some(&subject), permission_name(query).as_str()),
            expected
        );
    }

    #[test]
    fn superuser_is_allowed_regardless_of_roles(
        (roles, held, query) in role_graph(),
        role_query in "[a-z]{1,8}",
    ) {
        let subject = hydrate(&roles, &held, true);

        prop_assert!(has_permission(Some(&subject), permission_name(query).as_str()));
        prop_assert!(has_role(Some(&subject), role_query.as_str()));
    }
}
