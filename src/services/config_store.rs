// Configuration Storage Service
// Handles config file read/write, version backup, and custom profile registration

use crate::models::{EngineMode, PersonaProfile};
use crate::services::profiles::{ProfileCatalog, DEFAULT_MODE, DEFAULT_PERSONA};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_BACKUPS: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to {action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn io_err<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> ConfigError + 'a {
    move |source| ConfigError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizerConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Fixed RNG seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub personas: HashMap<String, PersonaProfile>,
    #[serde(default)]
    pub modes: HashMap<String, EngineMode>,
}

impl Default for HumanizerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: DefaultsConfig::default(),
            seed: None,
            personas: HashMap::new(),
            modes: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsConfig {
    /// Language hint applied when a request carries none; detection otherwise.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_persona")]
    pub persona: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            language: None,
            persona: default_persona(),
            mode: default_mode(),
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_persona() -> String { DEFAULT_PERSONA.to_string() }
fn default_mode() -> String { DEFAULT_MODE.to_string() }

impl HumanizerConfig {
    /// Replace the run defaults with whichever values the caller supplied.
    pub fn with_overrides(
        mut self,
        language: Option<String>,
        persona: Option<String>,
        mode: Option<String>,
        seed: Option<u64>,
    ) -> Self {
        if language.is_some() {
            self.defaults.language = language;
        }
        if let Some(persona) = persona {
            self.defaults.persona = persona;
        }
        if let Some(mode) = mode {
            self.defaults.mode = mode;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// Built-in catalog extended with the configured personas and modes.
    /// Map keys win over the `name` fields inside each entry.
    pub fn build_catalog(&self) -> ProfileCatalog {
        let mut catalog = ProfileCatalog::default();
        for (key, persona) in &self.personas {
            let mut persona = persona.clone();
            persona.name = key.clone();
            catalog.insert_persona(persona);
        }
        for (key, mode) in &self.modes {
            let mut mode = mode.clone();
            mode.name = key.clone();
            catalog.insert_mode(mode);
        }
        catalog
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Store backed by an explicit config file; backups go next to it.
    pub fn from_file(config_file: PathBuf) -> Self {
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("humanliker"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(io_err("create", &self.config_dir))
    }

    /// Load configuration from file, or defaults when no file exists yet
    pub fn load(&self) -> Result<HumanizerConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(HumanizerConfig::default());
        }

        let content = fs::read_to_string(&self.config_file).map_err(io_err("read", &self.config_file))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self, config: &HumanizerConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content).map_err(io_err("write", &self.config_file))
    }

    fn backup_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir).map_err(io_err("create", &backup_dir))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file).map_err(io_err("back up", &self.config_file))?;

        self.cleanup_old_backups(&backup_dir, MAX_BACKUPS)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(io_err("read", backup_dir))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Timestamped names sort oldest first
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}
