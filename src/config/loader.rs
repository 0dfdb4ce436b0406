//! Configuration loader.
//!
//! Pipeline:
//! 1. Size check and read (UTF-8 BOM stripped)
//! 2. YAML parsing into [`EngineConfig`]
//! 3. `CMDTREE_*` environment overrides
//! 4. Validation

use std::path::Path;

use crate::config::schema::EngineConfig;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "CMDTREE_";

/// Limits applied while loading.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("CMDTREE_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// A loaded and validated configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The configuration.
    pub config: EngineConfig,

    /// Non-fatal issues.
    pub warnings: Vec<ValidationIssue>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads [`EngineConfig`] from files or strings.
pub struct ConfigLoader {
    limits: ConfigLimits,
    env: EnvLookup,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(ConfigLimits::default())
    }
}

impl ConfigLoader {
    /// Creates a loader reading overrides from the process environment.
    #[must_use]
    pub fn new(limits: ConfigLimits) -> Self {
        Self {
            limits,
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the environment lookup, e.g. with a fixed map in tests.
    #[must_use]
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Box::new(lookup);
        self
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, if YAML parsing
    /// fails, if an override is malformed, or if validation reports errors.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.limits.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.limits.max_config_size,
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        self.load_str(&raw, path)
    }

    /// Loads and validates configuration text; `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus file access.
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let config = if raw.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };
        self.finish(config, &origin.display().to_string())
    }

    /// Defaults plus environment overrides, validated.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is malformed or validation fails.
    pub fn load_defaults(&self) -> Result<LoadResult, ConfigError> {
        self.finish(EngineConfig::default(), "<defaults>")
    }

    fn finish(&self, mut config: EngineConfig, origin: &str) -> Result<LoadResult, ConfigError> {
        self.apply_env(&mut config)?;
        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.to_string(),
                errors: result.errors,
            });
        }
        for warning in &result.warnings {
            tracing::warn!(%warning, "configuration warning");
        }
        Ok(LoadResult {
            config,
            warnings: result.warnings,
        })
    }

    fn var(&self, key: &str) -> Option<(String, String)> {
        let name = format!("{ENV_PREFIX}{key}");
        (self.env)(&name).map(|value| (name, value))
    }

    fn apply_env(&self, config: &mut EngineConfig) -> Result<(), ConfigError> {
        if let Some((_, value)) = self.var("COMMAND_PREFIX") {
            config.command_prefix = Some(value).filter(|v| !v.is_empty());
        }
        if let Some((_, value)) = self.var("FLAG_PREFIX") {
            config.flag_prefix = value;
        }
        if let Some((_, value)) = self.var("SHORT_FLAG_PREFIX") {
            config.short_flag_prefix = value;
        }
        if let Some((name, value)) = self.var("CASE_INSENSITIVE") {
            config.case_insensitive = parse_bool(&name, &value)?;
        }
        if let Some((name, value)) = self.var("MAX_SUGGESTIONS") {
            let cap = value
                .trim()
                .parse()
                .map_err(|_| invalid(&name, &value, "a non-negative integer"))?;
            config.max_suggestions = Some(cap);
        }
        if let Some((name, value)) = self.var("COORDINATOR") {
            config.coordinator = value
                .parse()
                .map_err(|_| invalid(&name, &value, "'inline' or 'concurrent'"))?;
        }
        if let Some((_, value)) = self.var("EXECUTION_TIMEOUT") {
            config.execution_timeout = Some(value).filter(|v| !v.is_empty());
        }
        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value, "a boolean")),
    }
}

fn invalid(field: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
