//! Semantic validation of an [`EngineConfig`].
//!
//! Collects every issue instead of stopping at the first one.

use crate::config::schema::{CoordinatorKind, EngineConfig};
use crate::error::{Severity, ValidationIssue};

/// Suggestion caps above this are probably a mistake.
const LARGE_SUGGESTION_CAP: usize = 1000;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent the configuration from being used.
    pub errors: Vec<ValidationIssue>,

    /// Informational issues.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config`.
    pub fn validate(&mut self, config: &EngineConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_prefixes(config);
        self.validate_suggestions(config);
        self.validate_timeout(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_prefixes(&mut self, config: &EngineConfig) {
        if let Some(prefix) = &config.command_prefix
            && prefix.chars().any(char::is_whitespace)
        {
            self.add_error("command_prefix", "must not contain whitespace");
        }

        for (path, prefix) in [
            ("flag_prefix", &config.flag_prefix),
            ("short_flag_prefix", &config.short_flag_prefix),
        ] {
            if prefix.is_empty() {
                self.add_error(path, "must not be empty");
            } else if prefix.chars().any(char::is_whitespace) {
                self.add_error(path, "must not contain whitespace");
            }
        }

        if config.flag_prefix == config.short_flag_prefix {
            self.add_error(
                "short_flag_prefix",
                "must differ from flag_prefix",
            );
        } else if config.short_flag_prefix.starts_with(&config.flag_prefix) {
            self.add_error(
                "short_flag_prefix",
                "must not start with flag_prefix, short clusters would read as long flags",
            );
        }
    }

    fn validate_suggestions(&mut self, config: &EngineConfig) {
        match config.max_suggestions {
            Some(0) => self.add_error("max_suggestions", "must be greater than zero"),
            Some(n) if n > LARGE_SUGGESTION_CAP => self.add_warning(
                "max_suggestions",
                &format!("cap of {n} is unusually large (> {LARGE_SUGGESTION_CAP})"),
            ),
            _ => {}
        }
    }

    fn validate_timeout(&mut self, config: &EngineConfig) {
        let Some(raw) = &config.execution_timeout else {
            return;
        };
        match humantime::parse_duration(raw) {
            Err(e) => self.add_error("execution_timeout", &format!("invalid duration '{raw}': {e}")),
            Ok(d) if d.is_zero() => self.add_error("execution_timeout", "must be greater than zero"),
            Ok(_) if config.coordinator == CoordinatorKind::Inline => self.add_warning(
                "execution_timeout",
                "ignored by the inline coordinator",
            ),
            Ok(_) => {}
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(config: &EngineConfig) -> ValidationResult {
        Validator::new().validate(config)
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn default_config_is_valid() {
        let result = validate(&EngineConfig::default());
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn collects_all_errors() {
        let config = EngineConfig {
            command_prefix: Some("/ ".to_string()),
            flag_prefix: String::new(),
            max_suggestions: Some(0),
            execution_timeout: Some("soon".to_string()),
            ..EngineConfig::default()
        };
        let result = validate(&config);
        assert!(result.has_errors());
        assert_eq!(
            paths(&result.errors),
            ["command_prefix", "flag_prefix", "max_suggestions", "execution_timeout"]
        );
    }

    #[test]
    fn identical_prefixes_are_rejected() {
        let config = EngineConfig {
            flag_prefix: "-".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(paths(&validate(&config).errors), ["short_flag_prefix"]);
    }

    #[test]
    fn short_prefix_extending_long_is_rejected() {
        let config = EngineConfig {
            flag_prefix: "+".to_string(),
            short_flag_prefix: "++".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(paths(&validate(&config).errors), ["short_flag_prefix"]);
    }

    #[test]
    fn inline_timeout_is_a_warning() {
        let config = EngineConfig {
            execution_timeout: Some("5s".to_string()),
            ..EngineConfig::default()
        };
        let result = validate(&config);
        assert!(result.is_valid());
        assert_eq!(paths(&result.warnings), ["execution_timeout"]);
    }

    #[test]
    fn large_cap_is_a_warning() {
        let config = EngineConfig {
            max_suggestions: Some(5000),
            ..EngineConfig::default()
        };
        let result = validate(&config);
        assert!(result.is_valid());
        assert_eq!(paths(&result.warnings), ["max_suggestions"]);
    }
}
