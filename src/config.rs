//! Client Configuration
//!
//! Configuration for the client facade, loaded with the usual priority:
//! environment variables override the TOML file, which overrides defaults.
//!
//! The optional configuration file lives at
//! `$XDG_CONFIG_HOME/threadline/threadline.toml`
//! (typically `~/.config/threadline/threadline.toml`):
//!
//! ```toml
//! endpoint = "ws://localhost:8001/ws/chat"
//!
//! [transport]
//! max_reconnect_attempts = 5
//! reconnect_base_delay_ms = 1000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::TransportConfig;

/// Default backend endpoint
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8001/ws/chat";

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file at {}: {source}", .path.display())]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// Failed to parse the TOML
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for [`crate::ChatClient`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint of the backend
    pub endpoint: String,
    /// Connection management tunables
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `THREADLINE_ENDPOINT`: backend WebSocket URL
    /// - plus the `THREADLINE_RECONNECT_*` variables of
    ///   [`TransportConfig::from_env`]
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("THREADLINE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            transport: TransportConfig::from_env(),
        }
    }
}

/// Sections of the optional TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ClientToml {
    endpoint: Option<String>,
    transport: TransportToml,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TransportToml {
    max_reconnect_attempts: Option<u32>,
    reconnect_base_delay_ms: Option<u64>,
    channel_capacity: Option<usize>,
}

/// The default configuration file path, if a config directory exists
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("threadline").join("threadline.toml"))
}

/// Load configuration from defaults, the TOML file, then the environment
///
/// A missing file is not an error; a present-but-broken one is.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(path) = default_config_path() {
        if path.exists() {
            config = apply_file(config, &path)?;
        }
    }

    apply_env(&mut config);
    Ok(config)
}

/// Load configuration from an explicit file path, then the environment
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config_from_path(path: &Path) -> Result<ClientConfig, ConfigError> {
    let mut config = apply_file(ClientConfig::default(), path)?;
    apply_env(&mut config);
    Ok(config)
}

fn apply_file(mut config: ClientConfig, path: &Path) -> Result<ClientConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ClientToml = toml::from_str(&raw)?;

    if let Some(endpoint) = file.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(attempts) = file.transport.max_reconnect_attempts {
        config.transport.max_reconnect_attempts = attempts;
    }
    if let Some(delay) = file.transport.reconnect_base_delay_ms {
        config.transport.reconnect_base_delay_ms = delay;
    }
    if let Some(capacity) = file.transport.channel_capacity {
        config.transport.channel_capacity = capacity;
    }
    tracing::debug!(path = %path.display(), "applied config file");
    Ok(config)
}

fn apply_env(config: &mut ClientConfig) {
    if let Ok(endpoint) = std::env::var("THREADLINE_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Some(attempts) = std::env::var("THREADLINE_RECONNECT_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.transport.max_reconnect_attempts = attempts;
    }
    if let Some(delay) = std::env::var("THREADLINE_RECONNECT_DELAY")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.transport.reconnect_base_delay_ms = delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.transport.max_reconnect_attempts, 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "endpoint = \"ws://example.test:9000/ws\"\n\n[transport]\nmax_reconnect_attempts = 9"
        )
        .unwrap();
        file.flush().unwrap();

        let config = apply_file(ClientConfig::default(), file.path()).unwrap();
        assert_eq!(config.endpoint, "ws://example.test:9000/ws");
        assert_eq!(config.transport.max_reconnect_attempts, 9);
        // Untouched fields keep their defaults
        assert_eq!(config.transport.reconnect_base_delay_ms, 1000);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "endpoint = [this is not toml").unwrap();
        file.flush().unwrap();

        let result = apply_file(ClientConfig::default(), file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_an_error_when_explicit() {
        let result = load_config_from_path(Path::new("/no/such/threadline.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_default_config_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("threadline/threadline.toml"));
        }
    }
}
