//! Configuration management for kmgr.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! The resulting `Config` is built once at startup and shared
//! read-only behind an `Arc`.

use crate::core::error::{KmgrError, Result};
use crate::core::types::TextEncoding;
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest accepted export budget in bytes
pub const MIN_EXPORT_BYTES: usize = 1024;

/// Largest accepted export budget in bytes
pub const MAX_EXPORT_BYTES: usize = 10 * 1024 * 1024;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub packs: PacksConfig,
}

/// File access service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directories outside of which no read is permitted
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Base for resolving relative request paths
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Upper bound for a single /chunk read
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: u64,

    /// Upper bound for a single /lines window
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Average line length assumed when sizing the /lines scan prefix
    #[serde(default = "default_assumed_line_bytes")]
    pub assumed_line_bytes: u64,

    /// Bytes of a file scanned by /search
    #[serde(default = "default_max_search_bytes")]
    pub max_search_bytes: u64,

    /// Ceiling for the `max` parameter of /search
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Encoding used by /chunk when the request names none
    #[serde(default)]
    pub default_encoding: TextEncoding,
}

/// Knowledge pack configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacksConfig {
    /// Root holding packs/, scratch/ and repos.json
    #[serde(default = "default_packs_root")]
    pub root_dir: PathBuf,

    /// Repository alias or path used when a call names none
    #[serde(default)]
    pub default_repo: Option<String>,

    /// Archive size ceiling enforced after every build
    #[serde(default = "default_max_pack_mb")]
    pub max_pack_mb: u64,

    /// Maximum length of one appended chat record
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,

    /// Export budget used when a call names none
    #[serde(default = "default_export_bytes")]
    pub default_export_bytes: usize,

    /// Attempts for archive I/O before reporting failure
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// File name globs admitted into a pack
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    17777
}

fn default_working_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_roots() -> Vec<PathBuf> {
    vec![default_working_dir()]
}

fn default_max_chunk_bytes() -> u64 {
    512 * 1024
}

fn default_max_lines() -> usize {
    2000
}

fn default_assumed_line_bytes() -> u64 {
    256
}

fn default_max_search_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_max_search_results() -> usize {
    1000
}

fn default_packs_root() -> PathBuf {
    XdgDirs::new().data_dir
}

fn default_max_pack_mb() -> u64 {
    2048
}

fn default_max_content_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_export_bytes() -> usize {
    120_000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    250
}

fn default_include_patterns() -> Vec<String> {
    [
        "*.md", "*.txt", "*.rst", "*.py", "*.ps1", "*.psm1", "*.cs", "*.cpp", "*.h", "*.js",
        "*.ts", "*.tsx", "*.json", "*.yaml", "*.yml", "*.ini", "*.toml", "*.cfg", "*.sql",
        "*.sh", "*.bat", "*.rs",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".venv",
        "node_modules",
        "dist",
        "build",
        ".idea",
        ".vscode",
        ".vs",
        "__pycache__",
        "target",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            roots: default_roots(),
            working_dir: default_working_dir(),
            max_chunk_bytes: default_max_chunk_bytes(),
            max_lines: default_max_lines(),
            assumed_line_bytes: default_assumed_line_bytes(),
            max_search_bytes: default_max_search_bytes(),
            max_search_results: default_max_search_results(),
            default_encoding: TextEncoding::default(),
        }
    }
}

impl Default for PacksConfig {
    fn default() -> Self {
        Self {
            root_dir: default_packs_root(),
            default_repo: None,
            max_pack_mb: default_max_pack_mb(),
            max_content_bytes: default_max_content_bytes(),
            default_export_bytes: default_export_bytes(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            include_patterns: default_include_patterns(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| KmgrError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// File priority order:
    /// 1. KMGR_CONFIG env var
    /// 2. XDG config file (~/.config/kmgr/config.toml)
    /// 3. ./kmgr.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("KMGR_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("kmgr.toml").exists() {
                Self::from_file("kmgr.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    ///
    /// Unparseable numeric values are ignored; an unknown encoding
    /// name is a configuration error.
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("KMGR_FILES_HOST") {
            self.files.host = host;
        }
        if let Ok(port) = env::var("KMGR_FILES_PORT") {
            if let Ok(p) = port.parse() {
                self.files.port = p;
            }
        }
        if let Some(roots) = env::var_os("KMGR_FILES_ROOTS") {
            let parsed: Vec<PathBuf> = env::split_paths(&roots)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !parsed.is_empty() {
                self.files.roots = parsed;
            }
        }
        if let Ok(dir) = env::var("KMGR_FILES_WORKDIR") {
            self.files.working_dir = PathBuf::from(dir);
        }
        if let Ok(max) = env::var("KMGR_MAX_CHUNK_BYTES") {
            if let Ok(m) = max.parse() {
                self.files.max_chunk_bytes = m;
            }
        }
        if let Ok(max) = env::var("KMGR_MAX_LINES") {
            if let Ok(m) = max.parse() {
                self.files.max_lines = m;
            }
        }
        if let Ok(avg) = env::var("KMGR_ASSUMED_LINE_BYTES") {
            if let Ok(a) = avg.parse() {
                self.files.assumed_line_bytes = a;
            }
        }
        if let Ok(max) = env::var("KMGR_MAX_SEARCH_BYTES") {
            if let Ok(m) = max.parse() {
                self.files.max_search_bytes = m;
            }
        }
        if let Ok(max) = env::var("KMGR_MAX_SEARCH_RESULTS") {
            if let Ok(m) = max.parse() {
                self.files.max_search_results = m;
            }
        }
        if let Ok(enc) = env::var("KMGR_DEFAULT_ENCODING") {
            self.files.default_encoding = enc
                .parse()
                .map_err(|e: KmgrError| KmgrError::ConfigError(e.message()))?;
        }

        if let Ok(root) = env::var("KMGR_ROOT") {
            self.packs.root_dir = PathBuf::from(root);
        }
        if let Ok(repo) = env::var("KMGR_REPO") {
            if !repo.trim().is_empty() {
                self.packs.default_repo = Some(repo);
            }
        }
        if let Ok(max) = env::var("KMGR_MAX_PACK_MB") {
            if let Ok(m) = max.parse() {
                self.packs.max_pack_mb = m;
            }
        }
        if let Ok(max) = env::var("KMGR_MAX_CONTENT_BYTES") {
            if let Ok(m) = max.parse() {
                self.packs.max_content_bytes = m;
            }
        }
        if let Ok(bytes) = env::var("KMGR_EXPORT_BYTES") {
            if let Ok(b) = bytes.parse() {
                self.packs.default_export_bytes = b;
            }
        }
        if let Ok(attempts) = env::var("KMGR_RETRY_ATTEMPTS") {
            if let Ok(a) = attempts.parse() {
                self.packs.retry_attempts = a;
            }
        }
        if let Ok(delay) = env::var("KMGR_RETRY_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                self.packs.retry_delay_ms = d;
            }
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.files.roots.is_empty() {
            return Err(KmgrError::ConfigError(
                "At least one access root is required".to_string(),
            ));
        }

        if self.files.max_chunk_bytes == 0 {
            return Err(KmgrError::ConfigError(
                "Max chunk bytes must be non-zero".to_string(),
            ));
        }

        if self.files.max_lines == 0 || self.files.assumed_line_bytes == 0 {
            return Err(KmgrError::ConfigError(
                "Max lines and assumed line bytes must be non-zero".to_string(),
            ));
        }

        if self.files.max_search_bytes == 0 || self.files.max_search_results == 0 {
            return Err(KmgrError::ConfigError(
                "Search limits must be non-zero".to_string(),
            ));
        }

        if self.packs.max_pack_mb == 0 || self.packs.max_content_bytes == 0 {
            return Err(KmgrError::ConfigError(
                "Pack size limits must be non-zero".to_string(),
            ));
        }

        if self.packs.retry_attempts == 0 {
            return Err(KmgrError::ConfigError(
                "Retry attempts must be at least 1".to_string(),
            ));
        }

        if !(MIN_EXPORT_BYTES..=MAX_EXPORT_BYTES).contains(&self.packs.default_export_bytes) {
            return Err(KmgrError::ConfigError(format!(
                "Default export bytes must be within {MIN_EXPORT_BYTES}..={MAX_EXPORT_BYTES}"
            )));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen: {}:{}", self.files.host, self.files.port);
        tracing::info!("  Roots: {:?}", self.files.roots);
        tracing::info!("  Working dir: {:?}", self.files.working_dir);
        tracing::info!("  Max chunk: {} bytes", self.files.max_chunk_bytes);
        tracing::info!(
            "  Max lines: {} (assumed {} bytes/line)",
            self.files.max_lines,
            self.files.assumed_line_bytes
        );
        tracing::info!("  Max search scan: {} bytes", self.files.max_search_bytes);
        tracing::info!("  Default encoding: {}", self.files.default_encoding);
        tracing::info!("  Packs root: {:?}", self.packs.root_dir);
        tracing::info!("  Max pack: {} MB", self.packs.max_pack_mb);
        tracing::info!(
            "  Retry: {} attempts, {} ms apart",
            self.packs.retry_attempts,
            self.packs.retry_delay_ms
        );
    }
}
