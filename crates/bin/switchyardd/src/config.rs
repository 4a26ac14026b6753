//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `switchyard.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;
use switchyard_app::dispatcher::DispatcherConfig;
use switchyard_app::location::DEFAULT_MODE;

const CONFIG_FILE: &str = "switchyard.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Dispatcher settings.
    pub kernel: KernelConfig,
    /// Initial location context.
    pub location: LocationConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Dispatcher configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Deadline for every request and command, in milliseconds.
    pub request_timeout_ms: u64,
}

/// Location context seed.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Local offset from UTC, east positive.
    pub utc_offset_minutes: i32,
    /// Mode the hub starts in.
    pub initial_mode: String,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual/demo integration.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `switchyard.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SWITCHYARD_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("SWITCHYARD_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("SWITCHYARD_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("SWITCHYARD_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(ms) = lookup("SWITCHYARD_REQUEST_TIMEOUT_MS").and_then(|val| val.parse().ok()) {
            self.kernel.request_timeout_ms = ms;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.kernel.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be non-zero".to_string(),
            ));
        }
        self.utc_offset()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            request_timeout: Duration::from_millis(self.kernel.request_timeout_ms),
        }
    }

    /// Return the configured local offset.
    ///
    /// # Errors
    ///
    /// Fails when the offset is a day or more away from UTC.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.location
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "utc offset out of range: {} minutes",
                    self.location.utc_offset_minutes
                ))
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "switchyardd=info,switchyard=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            initial_mode: DEFAULT_MODE.to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
