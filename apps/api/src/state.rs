use std::sync::Arc;

use rolegate_application::{
    AssignmentService, AuthorizationService, RoleRegistryService, SubjectService,
};

use crate::auth::SubjectAuthenticator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_registry_service: RoleRegistryService,
    pub subject_service: SubjectService,
    pub assignment_service: AssignmentService,
    pub authorization_service: AuthorizationService,
    pub authenticator: Arc<dyn SubjectAuthenticator>,
    pub store_backend: &'static str,
}
