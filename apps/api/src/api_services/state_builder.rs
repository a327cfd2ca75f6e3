use std::sync::Arc;

use rolegate_application::{
    AssignmentService, AuthorizationService, PermissionRepository, RoleRegistryService,
    RoleRepository, SubjectRepository, SubjectService,
};
use rolegate_core::AppError;
use rolegate_infrastructure::{InMemoryRbacRepository, PostgresRbacRepository};
use tracing::info;

use crate::api_config::{ApiConfig, AuthModeConfig, StoreBackendConfig};
use crate::auth::{HeaderSubjectAuthenticator, StaticSubjectAuthenticator, SubjectAuthenticator};
use crate::state::AppState;

use super::database::connect_and_migrate;

/// The three store ports, usually served by one adapter.
#[derive(Clone)]
pub struct RbacStore {
    role_repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
    subject_repository: Arc<dyn SubjectRepository>,
}

impl RbacStore {
    pub fn new<T>(store: Arc<T>) -> Self
    where
        T: RoleRepository + PermissionRepository + SubjectRepository + 'static,
    {
        Self {
            role_repository: store.clone(),
            permission_repository: store.clone(),
            subject_repository: store,
        }
    }
}

pub async fn build_store(config: &ApiConfig) -> Result<RbacStore, AppError> {
    match &config.store_backend {
        StoreBackendConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            Ok(RbacStore::new(Arc::new(PostgresRbacRepository::new(pool))))
        }
        StoreBackendConfig::Memory => {
            info!("using in-memory entity store; data is lost on shutdown");
            Ok(RbacStore::new(Arc::new(InMemoryRbacRepository::new())))
        }
    }
}

pub fn build_app_state(store: RbacStore, config: &ApiConfig) -> AppState {
    let authenticator: Arc<dyn SubjectAuthenticator> = match config.auth_mode {
        AuthModeConfig::Header => Arc::new(HeaderSubjectAuthenticator),
        AuthModeConfig::Static(subject_id) => Arc::new(StaticSubjectAuthenticator::new(subject_id)),
    };

    AppState {
        role_registry_service: RoleRegistryService::new(
            store.role_repository,
            store.permission_repository,
            config.unknown_permissions,
        ),
        subject_service: SubjectService::new(store.subject_repository.clone()),
        assignment_service: AssignmentService::new(store.subject_repository.clone()),
        authorization_service: AuthorizationService::new(store.subject_repository),
        authenticator,
        store_backend: config.store_backend_name(),
    }
}
