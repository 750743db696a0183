//! Config validation with user-friendly error messages.

use crate::schema::WardenConfig;
use std::collections::HashMap;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &WardenConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_logging(config, &mut report);
    validate_dispatch(config, &mut report);
    validate_modules(config, &mut report);
    report
}

fn validate_logging(config: &WardenConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else { return };
    if EnvFilter::try_new(level).is_err() {
        report.error("logging.level", format!("'{level}' is not a valid log filter"));
    }
}

fn validate_dispatch(config: &WardenConfig, report: &mut ValidationReport) {
    let Some(dispatch) = &config.dispatch else { return };
    if dispatch.execute_timeout_ms == Some(0) {
        report.error("dispatch.executeTimeoutMs", "Timeout must be greater than zero");
    }
    if dispatch.max_in_flight == Some(0) {
        report.error("dispatch.maxInFlight", "At least one message must be allowed in flight");
    }
}

fn validate_modules(config: &WardenConfig, report: &mut ValidationReport) {
    let Some(modules) = &config.modules else { return };
    validate_names("modules.roles", &modules.roles, report);
    validate_names("modules.channels", &modules.channels, report);
    validate_names("modules.filterActions", &modules.filter_actions, report);
    for (i, action) in modules.filter_actions.iter().enumerate() {
        if action.chars().any(char::is_whitespace) {
            report.error(format!("modules.filterActions[{i}]"), "Filter actions must be single words");
        }
    }
}

/// Names become command options: they must be non-empty and distinct, and
/// names equal up to case can never be told apart by the matcher.
fn validate_names(path: &str, names: &[String], report: &mut ValidationReport) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for (i, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            report.error(format!("{path}[{i}]"), "Name cannot be empty");
            continue;
        }
        match seen.get(&name.to_uppercase()) {
            Some(prev) if *prev == name.as_str() => {
                report.error(format!("{path}[{i}]"), format!("Duplicate name '{name}'"));
            }
            Some(prev) => {
                report.warn(
                    format!("{path}[{i}]"),
                    format!("'{name}' differs from '{prev}' only by case; abbreviations of either will not resolve"),
                );
            }
            None => {
                seen.insert(name.to_uppercase(), name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{DispatchConfig, ModulesConfig};

    fn with_modules(modules: ModulesConfig) -> WardenConfig {
        WardenConfig { modules: Some(modules), ..Default::default() }
    }

    #[test]
    fn test_defaults_are_valid() {
        let report = validate(&apply_all_defaults(WardenConfig::default()));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = WardenConfig {
            dispatch: Some(DispatchConfig { execute_timeout_ms: Some(0), max_in_flight: Some(0) }),
            ..Default::default()
        };
        let report = validate(&config);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_case_only_collision_warns() {
        let report = validate(&with_modules(ModulesConfig {
            roles: vec!["Mod".into(), "MOD".into()],
            ..Default::default()
        }));
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "modules.roles[1]");
    }

    #[test]
    fn test_duplicates_and_blanks_rejected() {
        let report = validate(&with_modules(ModulesConfig {
            channels: vec!["general".into(), "general".into(), " ".into()],
            filter_actions: vec!["mute user".into()],
            ..Default::default()
        }));
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = apply_all_defaults(WardenConfig::default());
        config.logging.as_mut().unwrap().level = Some("warden=loud".into());
        assert!(!validate(&config).is_valid());
    }
}
