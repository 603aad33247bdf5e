use crate::criteria_store::MIN_DEBOUNCE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period after the last keystroke before the filter is sent
    pub debounce_ms: u64,

    /// Fetch the unfiltered list as soon as the engine starts
    pub initial_load: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the perks service
    pub base_url: String,

    /// Path of the list endpoint
    pub perks_path: String,

    /// Per-request timeout
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, RUST_LOG takes precedence
    pub level: String,

    /// Entries kept in the in-memory log buffer
    pub max_entries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: MIN_DEBOUNCE.as_millis() as u64,
            initial_load: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            perks_path: "/api/perks/all".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            max_entries: 1000,
        }
    }
}

impl EngineConfig {
    /// Debounce window, never shorter than the page's 500ms
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms).max(MIN_DEBOUNCE)
    }
}

impl Config {
    /// Load config from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        Ok(config)
    }

    /// Settings that were adjusted on load, for the caller to log once
    /// tracing is initialized
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.engine.debounce_ms < MIN_DEBOUNCE.as_millis() as u64 {
            warnings.push(format!(
                "debounce_ms = {} is below {}ms, using {}ms",
                self.engine.debounce_ms,
                MIN_DEBOUNCE.as_millis(),
                MIN_DEBOUNCE.as_millis()
            ));
        }
        warnings
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("perk-filter").join("config.toml"))
    }

    /// Default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# perk-filter configuration
# Location: ~/.config/perk-filter/config.toml (Linux)
#           ~/Library/Application Support/perk-filter/config.toml (macOS)
#           %APPDATA%\perk-filter\config.toml (Windows)

[engine]
# Quiet period after the last keystroke before the filter is sent.
# Values below 500 are raised to 500.
debounce_ms = 500

# Fetch the unfiltered list on startup
initial_load = true

[catalog]
base_url = "http://localhost:4000"
perks_path = "/api/perks/all"
timeout_ms = 10000

[logging]
# tracing EnvFilter directive; RUST_LOG overrides it
level = "info"

# Entries kept for the `logs` command
max_entries = 1000
"#
        .to_string()
    }
}
