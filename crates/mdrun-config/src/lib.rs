//! Configuration management for mdrun.
//!
//! Parses `mdrun.toml` with serde and discovers it in the current directory
//! or its parents. CLI overrides are applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `images.cache_dir`
//! - `images.user_agent`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub base_font_size: Option<f32>,
    pub max_width: Option<f32>,
    pub images_enabled: Option<bool>,
    /// `Some(false)` disables the persistent payload cache.
    pub cache_enabled: Option<bool>,
}

const CONFIG_FILENAME: &str = "mdrun.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub images: ImagesConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Body text size; heading, code and marker sizes derive from it.
    pub base_font_size: f32,
    /// Rewrite literal `\n` sequences to newlines before parsing.
    pub unescape_newlines: bool,
    pub mentions: MentionsConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_font_size: 15.0,
            unescape_newlines: true,
            mentions: MentionsConfig::default(),
        }
    }
}

/// `[render.mentions]` section: which links are entity mentions.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MentionsConfig {
    pub path_prefix: String,
    pub scheme: String,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/user/".to_owned(),
            scheme: "mention".to_owned(),
        }
    }
}

/// `[images]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub enabled: bool,
    /// Images wider than this (in points) are scaled down.
    pub max_width: f32,
    /// In-memory cache bound in payload bytes.
    pub memory_capacity: usize,
    /// Global request timeout. Absent means the transport default.
    pub timeout_secs: Option<u64>,
    /// Persistent payload cache; relative paths resolve against the config file.
    pub cache_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_width: 300.0,
            memory_capacity: 50 * 1024 * 1024,
            timeout_secs: None,
            cache_dir: None,
            user_agent: None,
        }
    }
}

impl ImagesConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar { field: String, message: String },
}

const MAX_BASE_FONT_SIZE: f32 = 200.0;

fn require_positive(value: f32, field: &str) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be a positive number"
        )));
    }
    Ok(())
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// URI scheme syntax: a letter followed by letters, digits, `+`, `-` or `.`.
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `mdrun.toml` in the current directory and parents, falling back to
    /// defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the result (after overrides) is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(size) = settings.base_font_size {
            self.render.base_font_size = size;
        }
        if let Some(max_width) = settings.max_width {
            self.images.max_width = max_width;
        }
        if let Some(enabled) = settings.images_enabled {
            self.images.enabled = enabled;
        }
        if settings.cache_enabled == Some(false) {
            self.images.cache_dir = None;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        discover_from(&cwd)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_images()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        let render = &self.render;
        require_positive(render.base_font_size, "render.base_font_size")?;
        if render.base_font_size > MAX_BASE_FONT_SIZE {
            return Err(ConfigError::Validation(format!(
                "render.base_font_size cannot exceed {MAX_BASE_FONT_SIZE}"
            )));
        }

        let mentions = &render.mentions;
        if !mentions.path_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "render.mentions.path_prefix must start with '/'".to_owned(),
            ));
        }
        if !is_valid_scheme(&mentions.scheme) {
            return Err(ConfigError::Validation(format!(
                "render.mentions.scheme {:?} is not a valid URI scheme",
                mentions.scheme
            )));
        }
        Ok(())
    }

    fn validate_images(&self) -> Result<(), ConfigError> {
        let images = &self.images;
        require_positive(images.max_width, "images.max_width")?;
        if images.memory_capacity == 0 {
            return Err(ConfigError::Validation(
                "images.memory_capacity must be greater than 0".to_owned(),
            ));
        }
        if images.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "images.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if let Some(user_agent) = &images.user_agent {
            require_non_empty(user_agent, "images.user_agent")?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.images.cache_dir {
            let expanded = expand::expand_env(&dir.to_string_lossy(), "images.cache_dir")?;
            self.images.cache_dir = Some(PathBuf::from(expanded));
        }
        if let Some(user_agent) = &self.images.user_agent {
            self.images.user_agent = Some(expand::expand_env(user_agent, "images.user_agent")?);
        }
        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(dir) = &mut self.images.cache_dir
            && dir.is_relative()
        {
            *dir = config_dir.join(&*dir);
        }
    }
}

/// Search for the config file in `start` and its parents.
fn discover_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
