//! Service configuration
//!
//! The HTTP service is constructed with an explicit [`ServiceConfig`]. Values
//! come from built-in defaults, optionally overridden by a TOML file and then
//! by command-line flags.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;

/// Origin entry that permits every origin
pub const ANY_ORIGIN: &str = "*";

/// Default request body limit (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// HTTP service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the server listens on
    pub bind_addr: SocketAddr,
    /// Origins permitted by CORS; `*` permits any origin
    pub allowed_origins: Vec<String>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allowed_origins: vec![ANY_ORIGIN.to_string()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, IntegrityError> {
        toml::from_str(s).map_err(|e| IntegrityError::ConfigError(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, IntegrityError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Override the bind address
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Replace the allowed origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == ANY_ORIGIN)
    }

    /// Value for `Access-Control-Allow-Origin`, or `None` if the origin is not allowed.
    ///
    /// Allowed origins are echoed back so credentialed requests work; `*` is
    /// only returned when the wildcard is configured and no origin was sent.
    pub fn cors_origin(&self, origin: Option<&str>) -> Option<String> {
        match origin {
            Some(origin) if self.allows_any_origin() => Some(origin.to_string()),
            Some(origin) => self
                .allowed_origins
                .iter()
                .find(|o| o.as_str() == origin)
                .cloned(),
            None if self.allows_any_origin() => Some(ANY_ORIGIN.to_string()),
            None => None,
        }
    }
}
