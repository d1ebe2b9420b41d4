//! Environment-based configuration for the gateway binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default bind address.
const DEFAULT_ADDR: &str = "0.0.0.0:3000";
/// Default directory snapshot path.
const DEFAULT_DIRECTORY: &str = "directory.json";
/// Default build backend base URL.
const DEFAULT_BACKEND_URL: &str = "http://localhost:5352";

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (`BUILDHOOK_ADDR`).
    pub addr: SocketAddr,

    /// Path of the directory snapshot file (`BUILDHOOK_DIRECTORY`).
    pub directory_path: PathBuf,

    /// Base URL of the build backend (`BUILDHOOK_BACKEND_URL`).
    pub backend_url: String,
}

impl Config {
    /// Reads the configuration from environment variables, with development
    /// defaults for everything.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = std::env::var("BUILDHOOK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = addr.parse().map_err(|_| ConfigError::Invalid {
            name: "BUILDHOOK_ADDR",
            value: addr.clone(),
        })?;

        let directory_path = std::env::var("BUILDHOOK_DIRECTORY")
            .unwrap_or_else(|_| DEFAULT_DIRECTORY.to_string())
            .into();

        let backend_url = std::env::var("BUILDHOOK_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());

        Ok(Config {
            addr,
            directory_path,
            backend_url,
        })
    }
}
