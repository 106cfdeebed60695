//! Configuration resolution for HMS.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`$XDG_CONFIG_HOME/hms/settings.json`)
//! 3. Project config (`.hms/settings.json`)
//! 4. Environment variables (`HMS_*`)
//! 5. CLI arguments (highest priority, applied by the binary)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::schedule::ShiftHours;

/// Complete HMS configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub booking: BookingRules,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub database_path: Option<PathBuf>,
    pub hospital_name: String,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            database_path: None,
            hospital_name: "City General Hospital".to_string(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Intake rules applied to every booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRules {
    pub shift_hours: ShiftHours,
    /// Upper bound on the free-text message, in characters.
    pub message_max_chars: usize,
    /// How far ahead a booking may be made. `None` disables the check.
    pub max_days_ahead: Option<u32>,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            shift_hours: ShiftHours::default(),
            message_max_chars: 2000,
            max_days_ahead: Some(180),
        }
    }
}

/// Storage call bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Timeout applied to every storage operation (milliseconds).
    pub op_timeout_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            op_timeout_ms: 5_000,
            retry: RetryPolicy::default(),
        }
    }
}

impl StorageConfig {
    pub const fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(dir) = project_dir {
        let project_path = dir.join(".hms").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    apply_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hms").join("settings.json"))
}

/// Get the default database path.
pub fn database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("hms").join("hms.db"))
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    if overlay.server.database_path.is_some() {
        base.server.database_path = overlay.server.database_path;
    }
    base.server.addr = overlay.server.addr;
    base.server.hospital_name = overlay.server.hospital_name;
    base.server.log_level = overlay.server.log_level;
    base.server.log_json = overlay.server.log_json;

    base.booking = overlay.booking;
    base.storage = overlay.storage;
}

/// Apply `HMS_*` overrides using the given variable lookup.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("HMS_ADDR") {
        config.server.addr = val;
    }
    if let Some(val) = lookup("HMS_DB_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("HMS_HOSPITAL_NAME") {
        config.server.hospital_name = val;
    }
    if let Some(val) = lookup("HMS_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(n) = lookup("HMS_MESSAGE_MAX_CHARS").and_then(|v| v.parse().ok()) {
        config.booking.message_max_chars = n;
    }
    if let Some(n) = lookup("HMS_STORAGE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.storage.op_timeout_ms = n;
    }
    if let Some(n) = lookup("HMS_STORAGE_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
        config.storage.retry.max_attempts = n;
    }
}
