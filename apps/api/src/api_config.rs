use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegate_application::UnknownPermissionPolicy;
use rolegate_core::{AppError, SubjectId};
use tracing_subscriber::EnvFilter;

/// Command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Seed,
}

impl ApiCommand {
    fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'seed'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackendConfig {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthModeConfig {
    Header,
    Static(SubjectId),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub store_backend: StoreBackendConfig,
    pub api_host: String,
    pub api_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub auth_mode: AuthModeConfig,
    pub unknown_permissions: UnknownPermissionPolicy,
    pub seed_superuser_email: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = env::args().nth(1);
        Self::from_lookup(command.as_deref(), |name| env::var(name).ok())
    }

    pub fn from_lookup(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let command = ApiCommand::parse(command)?;

        let store_backend = match optional("STORE_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StoreBackendConfig::Postgres {
                database_url: optional("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation("DATABASE_URL is required".to_owned())
                })?,
            },
            "memory" => StoreBackendConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "STORE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if command == ApiCommand::Migrate && store_backend == StoreBackendConfig::Memory {
            return Err(AppError::Validation(
                "the migrate command requires STORE_BACKEND=postgres".to_owned(),
            ));
        }

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match optional("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let auth_mode = match optional("AUTH_MODE")
            .unwrap_or_else(|| "header".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "header" => AuthModeConfig::Header,
            "static" => {
                let subject_id = optional("AUTH_STATIC_SUBJECT_ID")
                    .ok_or_else(|| {
                        AppError::Validation(
                            "AUTH_STATIC_SUBJECT_ID is required when AUTH_MODE=static".to_owned(),
                        )
                    })?
                    .trim()
                    .parse::<i64>()
                    .map_err(|error| {
                        AppError::Validation(format!("invalid AUTH_STATIC_SUBJECT_ID: {error}"))
                    })?;
                AuthModeConfig::Static(SubjectId::from_i64(subject_id))
            }
            other => {
                return Err(AppError::Validation(format!(
                    "AUTH_MODE must be either 'header' or 'static', got '{other}'"
                )));
            }
        };

        let unknown_permissions = optional("RBAC_UNKNOWN_PERMISSIONS")
            .map(|value| UnknownPermissionPolicy::parse(value.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            command,
            store_backend,
            api_host,
            api_port,
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
            auth_mode,
            unknown_permissions,
            seed_superuser_email: optional("SEED_SUPERUSER_EMAIL"),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn store_backend_name(&self) -> &'static str {
        match self.store_backend {
            StoreBackendConfig::Postgres { .. } => "postgres",
            StoreBackendConfig::Memory => "memory",
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
