// Configuration Storage Service
// Handles config file read/write, version backup and environment overrides

use crate::models::ModelConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const APP_DIR_NAME: &str = "ai-text-detector";
pub const CONFIG_FILE_NAME: &str = "config.json";
const BACKUPS_TO_KEEP: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to create config dir: {0}")]
    CreateDir(#[source] std::io::Error),
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write config: {0}")]
    Write(#[source] std::io::Error),
    #[error("Failed to create backup: {0}")]
    Backup(#[source] std::io::Error),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidOverride { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default)]
    pub detector: ModelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            model_dir: default_model_dir(),
            data_path: default_data_path(),
            test_size: default_test_size(),
            detector: ModelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_model_dir() -> PathBuf { PathBuf::from("model") }
fn default_data_path() -> PathBuf { PathBuf::from("balanced_ai_human_prompts.csv") }
fn default_test_size() -> f64 { 0.2 }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

impl AppConfig {
    /// Apply `PORT`, `HOST` and `AITD_MODEL_DIR` from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable source. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var: "PORT", value: port.clone() })?;
            debug!("[CONFIG] PORT override: {}", self.server.port);
        }
        if let Some(host) = get("HOST") {
            self.server.host = host.trim().to_string();
            debug!("[CONFIG] HOST override: {}", self.server.host);
        }
        if let Some(dir) = get("AITD_MODEL_DIR") {
            self.model_dir = PathBuf::from(dir.trim());
            debug!("[CONFIG] AITD_MODEL_DIR override: {}", self.model_dir.display());
        }
        Ok(())
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join(CONFIG_FILE_NAME);
        Self { config_dir, config_file }
    }

    /// Store backed by an explicit file path (e.g. `--config`)
    pub fn from_file(config_file: PathBuf) -> Self {
        let config_dir = config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME))
    }

    /// Store at the default location, falling back to the working directory
    pub fn open_default() -> Self {
        Self::new(Self::default_config_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn exists(&self) -> bool {
        self.config_file.is_file()
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(ConfigError::CreateDir)
    }

    /// Load configuration from file, defaults when the file is absent
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            debug!("[CONFIG] {} not found, using defaults", self.config_file.display());
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file).map_err(|source| ConfigError::Read {
            path: self.config_file.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.config_file.clone(),
            source,
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content).map_err(ConfigError::Write)?;
        info!("[CONFIG] Saved {}", self.config_file.display());
        Ok(())
    }

    fn backup_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir).map_err(ConfigError::Backup)?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file).map_err(ConfigError::Backup)?;

        cleanup_old_backups(&backup_dir, BACKUPS_TO_KEEP);
        Ok(())
    }
}

/// Remove old backups, keeping only the most recent N
fn cleanup_old_backups(backup_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(backup_dir) {
        Ok(rd) => rd
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect(),
        Err(e) => {
            warn!("[CONFIG] Failed to read backup dir: {}", e);
            return;
        }
    };

    if entries.len() <= keep {
        return;
    }

    // Oldest first; name breaks ties since the names embed the timestamp
    entries.sort_by_key(|e| {
        let modified = e
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        (modified, e.file_name())
    });

    let remove_count = entries.len() - keep;
    for entry in entries.iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}
