//! Configuration loading and root folder resolution
//!
//! Every service builds one [`TomlConfig`] at startup and passes the pieces
//! it needs by reference into its components. Nothing below the binaries
//! reads environment variables or global state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "EMO_ROOT_FOLDER";

/// Application directory name used under the platform config/data dirs
pub const APP_DIR_NAME: &str = "emotion-game";

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/emotion-game
            dirs::data_local_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("/var/lib/emotion-game"))
        } else if cfg!(target_os = "macos") {
            // ~/Library/Application Support/emotion-game
            dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/emotion-game"))
        } else if cfg!(target_os = "windows") {
            // %LOCALAPPDATA%\emotion-game
            dirs::data_local_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\emotion-game"))
        } else {
            PathBuf::from("./emotion_game_data")
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. `info` or `emo_scores=debug,tower_http=info`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Canonical emotion label set and synonym table
///
/// The order of `canonical` defines confusion matrix row/column indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub canonical: Vec<String>,
    /// Alternate spelling → canonical label
    ///
    /// A `[labels]` table without `synonyms` means no synonyms at all.
    #[serde(default)]
    pub synonyms: BTreeMap<String, String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let canonical = ["angry", "disgust", "fear", "happy", "sadness", "surprise", "neutral"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let synonyms = [
            ("anger", "angry"),
            ("mad", "angry"),
            ("disgusted", "disgust"),
            ("fearful", "fear"),
            ("scared", "fear"),
            ("afraid", "fear"),
            ("happiness", "happy"),
            ("joy", "happy"),
            ("joyful", "happy"),
            ("sad", "sadness"),
            ("unhappy", "sadness"),
            ("surprised", "surprise"),
            ("calm", "neutral"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { canonical, synonyms }
    }
}

impl LabelConfig {
    /// Check the table is usable as a matrix axis
    ///
    /// Rejects an empty set, duplicate canonical labels (case-insensitive) and
    /// synonyms pointing at labels outside the set.
    pub fn validate(&self) -> Result<()> {
        if self.canonical.is_empty() {
            return Err(Error::Config("Canonical label set is empty".to_string()));
        }

        let mut seen = Vec::with_capacity(self.canonical.len());
        for label in &self.canonical {
            let key = label.trim().to_lowercase();
            if key.is_empty() {
                return Err(Error::Config("Canonical label set contains a blank label".to_string()));
            }
            if seen.contains(&key) {
                return Err(Error::Config(format!("Duplicate canonical label: {}", label)));
            }
            seen.push(key);
        }

        for (alias, target) in &self.synonyms {
            if !seen.contains(&target.trim().to_lowercase()) {
                return Err(Error::Config(format!(
                    "Synonym '{}' maps to unknown label '{}'",
                    alias, target
                )));
            }
        }

        Ok(())
    }
}

/// Strength/weakness classification thresholds (percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub strength_threshold: f64,
    pub weakness_threshold: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            strength_threshold: 80.0,
            weakness_threshold: 50.0,
        }
    }
}

impl SummaryConfig {
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.strength_threshold) || !in_range(self.weakness_threshold) {
            return Err(Error::Config("Summary thresholds must be within 0-100".to_string()));
        }
        if self.weakness_threshold >= self.strength_threshold {
            return Err(Error::Config(format!(
                "weakness_threshold ({}) must be below strength_threshold ({})",
                self.weakness_threshold, self.strength_threshold
            )));
        }
        Ok(())
    }
}

/// Score artifact storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Artifacts larger than this are skipped during a scan
    pub max_artifact_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_artifact_bytes: 1024 * 1024,
        }
    }
}

/// Remote psychological-analysis generator settings
///
/// With no endpoint the sandbox service uses templated analysis only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Per-module TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub logging: LoggingConfig,
    pub labels: LabelConfig,
    pub summary: SummaryConfig,
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
}

/// Default TOML location for a module: `<config_dir>/emotion-game/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(format!("{}.toml", module_name)))
}

/// Load a TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are used.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write a TOML config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Root folder resolution, in priority order:
/// 1. Command-line argument
/// 2. `EMO_ROOT_FOLDER` environment variable
/// 3. `root_folder` from the TOML config
/// 4. Compiled default
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_root(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("[{}] Root folder from config file: {}", self.module_name, path.display());
            return path.clone();
        }

        let default = CompiledDefaults::for_current_platform().root_folder;
        info!("[{}] Root folder from compiled default: {}", self.module_name, default.display());
        default
    }
}

/// Creates the root folder layout on first start
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Directory holding per-round score artifacts
    pub fn scores_path(&self) -> PathBuf {
        self.root_folder.join("scores")
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder).map_err(|e| {
                Error::Config(format!(
                    "Failed to create root folder {}: {}",
                    self.root_folder.display(),
                    e
                ))
            })?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }
}
