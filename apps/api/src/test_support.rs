use std::sync::Arc;

use rolegate_application::UnknownPermissionPolicy;
use rolegate_infrastructure::InMemoryRbacRepository;

use crate::api_config::{ApiCommand, ApiConfig, AuthModeConfig, StoreBackendConfig};
use crate::api_services::{RbacStore, build_app_state};
use crate::state::AppState;

pub(crate) fn memory_config() -> ApiConfig {
    ApiConfig {
        command: ApiCommand::Serve,
        store_backend: StoreBackendConfig::Memory,
        api_host: "127.0.0.1".to_owned(),
        api_port: 0,
        cors_allowed_origin: None,
        auth_mode: AuthModeConfig::Header,
        unknown_permissions: UnknownPermissionPolicy::Ignore,
        seed_superuser_email: None,
    }
}

pub(crate) fn memory_state() -> AppState {
    build_app_state(
        RbacStore::new(Arc::new(InMemoryRbacRepository::new())),
        &memory_config(),
    )
}
