//! Configuration schema.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tokenizer::FlagSyntax;
use crate::tree::TreeSettings;

/// Which execution coordinator a manager uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatorKind {
    /// Handlers run on the dispatching thread.
    #[default]
    Inline,
    /// Handlers run on a tokio runtime.
    Concurrent,
}

impl std::str::FromStr for CoordinatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!("unknown coordinator '{other}'")),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix stripped from raw input, e.g. `/`.
    pub command_prefix: Option<String>,

    /// Marker of long flags.
    pub flag_prefix: String,

    /// Marker of short flag clusters.
    pub short_flag_prefix: String,

    /// Whether literals match regardless of case.
    pub case_insensitive: bool,

    /// Cap on returned suggestions.
    pub max_suggestions: Option<usize>,

    /// Execution strategy.
    pub coordinator: CoordinatorKind,

    /// Execution timeout for the concurrent coordinator, e.g. `30s`.
    pub execution_timeout: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_prefix: None,
            flag_prefix: "--".to_string(),
            short_flag_prefix: "-".to_string(),
            case_insensitive: false,
            max_suggestions: None,
            coordinator: CoordinatorKind::Inline,
            execution_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Tree settings derived from this configuration.
    #[must_use]
    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings {
            case_insensitive: self.case_insensitive,
            flags: FlagSyntax::new(self.flag_prefix.as_str(), self.short_flag_prefix.as_str()),
        }
    }

    /// The parsed execution timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the timeout is not a
    /// human-readable duration.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.execution_timeout
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw).map_err(|e| ConfigError::InvalidValue {
                    field: "execution_timeout".to_string(),
                    value: raw.to_string(),
                    expected: format!("a duration such as '30s' ({e})"),
                })
            })
            .transpose()
    }
}
