//! Domain entities, invariants and the authorization evaluator.

#![forbid(unsafe_code)]

mod authorization;
mod permission;
mod role;
mod subject;

pub use authorization::{
    AccessDecision, AccessRequirement, AuthorizationSubject, evaluate_permission, evaluate_role,
    has_permission, has_role,
};
pub use permission::Permission;
pub use role::{DEFAULT_GUARD_NAME, Role, normalize_guard_name};
pub use subject::{EmailAddress, Subject};
