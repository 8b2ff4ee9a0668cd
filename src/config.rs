//! Configuration for lectern.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (LECTERN_CATALOG, LECTERN_LOG)
//! 2. Project config file (.lectern/config.yaml)
//! 3. User config file (<config dir>/lectern/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .lectern/config.yaml
//! - Paths in config file are relative to the project root (the parent of .lectern/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::text::DEFAULT_TITLE_MAX_LENGTH;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Default log filter when neither RUST_LOG nor LECTERN_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub log: Option<LogConfig>,
    #[serde(default)]
    pub slides: Option<SlidesConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Asset catalog file or glob pattern (relative to the project root)
    pub catalog: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// tracing EnvFilter directive, e.g. `lectern=debug`
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlidesConfig {
    pub title_max_length: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Asset catalog used by `lectern resolve`
    pub catalog: Option<PathBuf>,
    /// Log filter directive
    pub log_filter: String,
    /// Maximum length of derived slide titles
    pub title_max_length: usize,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            title_max_length: DEFAULT_TITLE_MAX_LENGTH,
            config_file: None,
        }
    }
}

/// Find config file by searching a directory and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".lectern").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    // Fall back to the user config directory
    let user_config = dirs::config_dir()?.join("lectern").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources, searching from `start`
fn load_config_from(start: &Path) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig::default();

    if let Some(config_path) = find_config_file(start) {
        let file = load_config_file(&config_path)?;

        // Base directory is the parent of .lectern/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        config.catalog = file
            .paths
            .catalog
            .as_deref()
            .map(|catalog| resolve_path(base_dir, catalog));
        if let Some(filter) = file.log.and_then(|log| log.filter) {
            config.log_filter = filter;
        }
        if let Some(length) = file.slides.and_then(|slides| slides.title_max_length) {
            config.title_max_length = length;
        }
        config.config_file = Some(config_path);
    }

    if let Ok(catalog) = std::env::var("LECTERN_CATALOG") {
        config.catalog = Some(PathBuf::from(catalog));
    }
    if let Ok(filter) = std::env::var("LECTERN_LOG") {
        config.log_filter = filter;
    }

    Ok(config)
}

fn load_config() -> Result<ResolvedConfig> {
    let current = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&current)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
