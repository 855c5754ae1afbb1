//! Configuration for the Latchkey client SDK.
//!
//! The configuration is deliberately small: where the backend lives,
//! and the two names the session synchronizer shares with its
//! environment (the persisted-session key and the one-time refresh
//! credential query parameter).

use serde::{Deserialize, Serialize};

/// Main configuration structure for a Latchkey client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoint configuration.
    pub backend: BackendConfig,
    /// Session synchronization configuration.
    pub session: SessionConfig,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the authentication service.
    pub auth_url: String,
    /// Base URL of the storage service.
    pub storage_url: String,
}

/// Session synchronization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the persisted-session key reported by cross-context
    /// broadcasts. Broadcasts for other keys are ignored.
    pub storage_key: String,
    /// Name of the query parameter carrying a one-time refresh
    /// credential redeemed at startup.
    pub refresh_param: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                auth_url: "http://localhost:1337/v1/auth".to_string(),
                storage_url: "http://localhost:1337/v1/storage".to_string(),
            },
            session: SessionConfig {
                storage_key: "latchkeySession".to_string(),
                refresh_param: "refreshToken".to_string(),
            },
        }
    }
}
