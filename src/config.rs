//! Configuration for rhythm.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (RHYTHM_HOME, RHYTHM_DOMAIN)
//! 2. Config file (.rhythm/config.yaml)
//! 3. Defaults (~/.rhythm, general domain)
//!
//! Config file discovery:
//! - Searches current directory and parents for .rhythm/config.yaml
//! - `home` in the config file is relative to the .rhythm/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::fabric::DEFAULT_BINARY;
use crate::core::limits::ExtractionLimits;
use crate::domain::Domain;
use crate::extractors::HttpSettings;
use crate::processors::summary::DEFAULT_PATTERN;
use crate::text::{DEFAULT_MAX_KEYWORDS, DEFAULT_WORDS_PER_MINUTE};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".rhythm";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub home: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    pub timeout_seconds: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub max_urls: Option<usize>,
    pub user_agent: Option<String>,
    /// Replaces the default denylist when set
    pub denylist: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessingConfig {
    pub words_per_minute: Option<usize>,
    pub max_keywords: Option<usize>,
    pub summary_pattern: Option<String>,
    pub fabric_binary: Option<String>,
}

/// Processor defaults used when a pipeline definition leaves them out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingSettings {
    pub words_per_minute: usize,
    pub max_keywords: usize,
    pub summary_pattern: String,
    pub fabric_binary: String,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            summary_pattern: DEFAULT_PATTERN.to_string(),
            fabric_binary: DEFAULT_BINARY.to_string(),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Absolute path to rhythm home
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Active domain profile
    pub domain: Domain,
    /// Limits applied to every extraction run
    pub limits: ExtractionLimits,
    /// User agent sent by the HTTP extractors
    pub user_agent: String,
    pub processing: ProcessingSettings,
}

impl ResolvedConfig {
    /// Directory searched for named pipeline definitions
    pub fn pipelines_dir(&self) -> PathBuf {
        self.home.join("pipelines")
    }

    /// HTTP settings for the extractors
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            user_agent: self.user_agent.clone(),
            ..HttpSettings::default()
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
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

/// Merge a parsed config file (if any) with environment overrides
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env_home: Option<String>,
    env_domain: Option<String>,
) -> Result<ResolvedConfig> {
    let (config_file, raw) = match file {
        Some((path, raw)) => (Some(path), raw),
        None => (None, ConfigFile::default()),
    };

    let home = match (env_home, raw.home.as_deref(), config_file.as_deref()) {
        (Some(env_home), _, _) => PathBuf::from(env_home),
        (None, Some(home), Some(path)) => {
            let rhythm_dir = path.parent().unwrap_or(Path::new("."));
            resolve_path(rhythm_dir, home)
        }
        _ => dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(CONFIG_DIR),
    };

    let domain = match env_domain.or(raw.domain) {
        Some(name) => name
            .parse::<Domain>()
            .with_context(|| format!("Invalid domain in configuration: {}", name))?,
        None => Domain::default(),
    };

    let defaults = ExtractionLimits::default();
    let extraction = raw.extraction;
    let limits = ExtractionLimits {
        timeout_seconds: extraction.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        max_concurrency: extraction.max_concurrency.unwrap_or(defaults.max_concurrency),
        max_urls: extraction.max_urls.unwrap_or(defaults.max_urls),
        denylist_patterns: extraction.denylist.unwrap_or(defaults.denylist_patterns),
        retry_policy: defaults.retry_policy,
    };
    let user_agent = extraction
        .user_agent
        .unwrap_or_else(|| HttpSettings::default().user_agent);

    let fallback = ProcessingSettings::default();
    let processing = raw.processing;
    let processing = ProcessingSettings {
        words_per_minute: processing.words_per_minute.unwrap_or(fallback.words_per_minute),
        max_keywords: processing.max_keywords.unwrap_or(fallback.max_keywords),
        summary_pattern: processing.summary_pattern.unwrap_or(fallback.summary_pattern),
        fabric_binary: processing.fabric_binary.unwrap_or(fallback.fabric_binary),
    };

    Ok(ResolvedConfig {
        home,
        config_file,
        domain,
        limits,
        user_agent,
        processing,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let file = match find_config_file(&cwd) {
        Some(path) => {
            let raw = load_config_file(&path)?;
            Some((path, raw))
        }
        None => None,
    };

    resolve(
        file,
        std::env::var("RHYTHM_HOME").ok(),
        std::env::var("RHYTHM_DOMAIN").ok(),
    )
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
