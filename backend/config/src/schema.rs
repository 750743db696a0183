//! Warden configuration schema, typed for serde YAML/JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardenConfig {
    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Command dispatch limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchConfig>,

    /// Vocabularies offered by the bundled feature modules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<ModulesConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_file: Option<bool>,
    /// Scrub e-mail addresses, tokens and phone numbers from logged command text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_content: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_timeout_ms: Option<u64>,
    /// Messages dispatched concurrently before new ones wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulesConfig {
    /// Roles the role module may give or take.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Channels the log module may send to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
    /// Actions a content filter entry may take on a match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_actions: Vec<String>,
}

impl WardenConfig {
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    pub fn dispatch(&self) -> DispatchConfig {
        self.dispatch.clone().unwrap_or_default()
    }

    pub fn modules(&self) -> ModulesConfig {
        self.modules.clone().unwrap_or_default()
    }
}
