//! `warden-config`: Warden runtime configuration.
//!
//! Provides:
//! - Typed config schema (logging, dispatch limits, feature module vocabularies)
//! - YAML loading with a missing-file fallback to defaults
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with warnings for names the command matcher cannot tell apart

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, parse_config};
pub use schema::{DispatchConfig, LoggingConfig, ModulesConfig, WardenConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, apply defaults, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors are returned; warnings are only logged.
pub async fn load_and_prepare(path: &Path) -> Result<WardenConfig> {
    let raw_config = load_config(path).await?;
    prepare(raw_config)
}

/// The post-load half of [`load_and_prepare`], for configs parsed elsewhere.
pub fn prepare(raw_config: WardenConfig) -> Result<WardenConfig> {
    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: WardenConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        return Err(first.into());
    }
    Ok(config)
}
