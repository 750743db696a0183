//! Config defaults: applies default values to parsed config.

use crate::schema::{DispatchConfig, LoggingConfig, ModulesConfig, WardenConfig};

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default upper bound on one provider `execute`, in milliseconds.
pub const DEFAULT_EXECUTE_TIMEOUT_MS: u64 = 10_000;

/// Default number of messages dispatched concurrently.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Filter actions offered when none are configured.
pub const DEFAULT_FILTER_ACTIONS: [&str; 3] = ["delete", "warn", "log"];

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: WardenConfig) -> WardenConfig {
    let config = apply_logging_defaults(config);
    let config = apply_dispatch_defaults(config);
    apply_module_defaults(config)
}

fn apply_logging_defaults(mut config: WardenConfig) -> WardenConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    logging.json_file.get_or_insert(true);
    logging.redact_content.get_or_insert(true);
    config
}

fn apply_dispatch_defaults(mut config: WardenConfig) -> WardenConfig {
    let dispatch = config.dispatch.get_or_insert_with(DispatchConfig::default);
    dispatch.execute_timeout_ms.get_or_insert(DEFAULT_EXECUTE_TIMEOUT_MS);
    dispatch.max_in_flight.get_or_insert(DEFAULT_MAX_IN_FLIGHT);
    config
}

fn apply_module_defaults(mut config: WardenConfig) -> WardenConfig {
    let modules = config.modules.get_or_insert_with(ModulesConfig::default);
    if modules.filter_actions.is_empty() {
        modules.filter_actions = DEFAULT_FILTER_ACTIONS.iter().map(|s| s.to_string()).collect();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_gaps_only() {
        let config = WardenConfig {
            dispatch: Some(DispatchConfig { execute_timeout_ms: Some(500), max_in_flight: None }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        assert_eq!(config.dispatch().execute_timeout_ms, Some(500));
        assert_eq!(config.dispatch().max_in_flight, Some(DEFAULT_MAX_IN_FLIGHT));
        assert_eq!(config.logging().level.as_deref(), Some("info"));
        assert_eq!(config.modules().filter_actions, vec!["delete", "warn", "log"]);
    }
}
