//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the API.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::access::AccessPolicy;

/// Root configuration for the todo API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// Listener configuration (bind address, route prefix).
    pub listener: ListenerConfig,

    /// SQLite database settings.
    pub database: DatabaseConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Trusted identity metadata.
    pub auth: AuthConfig,

    /// Authorization policy switches.
    pub access: AccessPolicy,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Prefix all API routes are mounted under. Empty mounts at the root.
    pub base_path: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            base_path: "/api-todo".to_string(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file, or `:memory:`.
    pub path: String,

    /// How long a statement waits on a locked database, in seconds.
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "todo.db".to_string(),
            busy_timeout_secs: 5,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Where the upstream authenticator puts the caller's identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub user_id_header: String,
    pub role_header: String,
    pub privilege_header: String,

    /// Separator between capability tokens in the privilege header.
    pub privilege_delimiter: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_id_header: "x-user-id".to_string(),
            role_header: "x-user-role".to_string(),
            privilege_header: "x-user-privilege".to_string(),
            privilege_delimiter: ",".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ApiConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.base_path, "/api-todo");
        assert_eq!(config.auth.privilege_header, "x-user-privilege");
        assert!(config.access.grants_allow_delete);
        assert!(!config.access.require_list_access_for_writes);
    }

    #[test]
    fn test_partial_section() {
        let config: ApiConfig = toml::from_str(
            r#"
            [database]
            path = ":memory:"

            [access]
            grants_allow_delete = false
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert!(!config.access.grants_allow_delete);
    }
}
