//! Feature modules bundled with the console host.
//!
//! `filter` is declared as a token tree; `role` and `log` compute their
//! options from live state, so the same path can offer different words to
//! different authors.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;
use tracing::info;
use warden_commands::{
    CommandHandler, CommandInvocation, CommandPath, CommandResponse, HelpProvider, Provider,
    ProviderRegistry, TreeProvider,
};
use warden_config::ModulesConfig;
use warden_core::MessageContext;
use warden_logging::DispatchEventLogger;

/// Register every bundled module.
pub async fn register_all(registry: &ProviderRegistry, modules: &ModulesConfig) {
    registry.register(Arc::new(filter_module(&modules.filter_actions))).await;
    registry.register(Arc::new(RoleModule::new(modules.roles.clone()))).await;
    registry.register(Arc::new(LogModule::new(modules.channels.clone()))).await;
    registry.register(Arc::new(HelpProvider::new(registry.clone()))).await;
}

fn tokens(path: &CommandPath) -> Vec<&str> {
    path.tokens().iter().map(String::as_str).collect()
}

// ---------------------------------------------------------------------------
// filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FilterEntry {
    pub action: String,
    pub pattern: Regex,
}

/// In-memory content filter list.
#[derive(Default)]
pub struct FilterHandler {
    entries: RwLock<Vec<FilterEntry>>,
}

impl FilterHandler {
    async fn add(&self, action: &str, pattern: &str) -> Result<CommandResponse> {
        if pattern.is_empty() {
            return Ok(CommandResponse::ephemeral(format!("Usage: filter add {action} <regex>")));
        }
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => return Ok(CommandResponse::ephemeral(format!("Invalid pattern: {e}"))),
        };
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.pattern.as_str() == pattern) {
            return Ok(CommandResponse::ephemeral(format!("`{pattern}` is already filtered")));
        }
        entries.push(FilterEntry { action: action.to_string(), pattern: regex });
        info!("[Filter] Added `{}` ({})", DispatchEventLogger::scrub(pattern), action);
        Ok(CommandResponse::ok(format!("Filtering `{pattern}` ({action})")))
    }

    async fn remove(&self, pattern: &str) -> CommandResponse {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.pattern.as_str() != pattern);
        if entries.len() == before {
            CommandResponse::ephemeral(format!("`{pattern}` is not filtered"))
        } else {
            CommandResponse::ok(format!("No longer filtering `{pattern}`"))
        }
    }

    async fn list(&self) -> CommandResponse {
        let entries = self.entries.read().await;
        if entries.is_empty() {
            return CommandResponse::ephemeral("No filters configured");
        }
        let lines: Vec<String> = entries
            .iter()
            .map(|e| format!("• `{}` → {}", e.pattern.as_str(), e.action))
            .collect();
        CommandResponse::ephemeral(lines.join("\n"))
    }

    async fn test(&self, text: &str) -> CommandResponse {
        let entries = self.entries.read().await;
        let hits: Vec<String> = entries
            .iter()
            .filter(|e| e.pattern.is_match(text))
            .map(|e| format!("`{}` ({})", e.pattern.as_str(), e.action))
            .collect();
        if hits.is_empty() {
            CommandResponse::ephemeral("No filter matches")
        } else {
            CommandResponse::ephemeral(format!("Matches: {}", hits.join(", ")))
        }
    }
}

#[async_trait]
impl CommandHandler for FilterHandler {
    async fn handle(&self, _ctx: &MessageContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        match tokens(&inv.path).as_slice() {
            ["filter", "add", action] => self.add(action, &inv.remainder).await,
            ["filter", "remove"] => Ok(self.remove(&inv.remainder).await),
            ["filter", "list"] => Ok(self.list().await),
            ["filter", "test"] => Ok(self.test(&inv.remainder).await),
            _ => bail!("filter does not handle `{}`", inv.path),
        }
    }
}

/// `filter add <action> <regex>`, `filter remove <regex>`, `filter list`, `filter test <text>`.
pub fn filter_module(actions: &[String]) -> TreeProvider {
    let mut tree = TreeProvider::new("filter", Arc::new(FilterHandler::default()))
        .command("filter remove")
        .command("filter list")
        .command("filter test");
    for action in actions {
        tree = tree.command_tokens(["filter", "add", action.as_str()]);
    }
    tree
}

// ---------------------------------------------------------------------------
// role
// ---------------------------------------------------------------------------

/// Self-assignable roles. `role take` only offers roles the author holds.
pub struct RoleModule {
    roles: Vec<String>,
    held: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl RoleModule {
    pub fn new(roles: Vec<String>) -> Self {
        Self { roles, held: RwLock::new(HashMap::new()) }
    }

    async fn held_by(&self, author: &str) -> BTreeSet<String> {
        self.held.read().await.get(author).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Provider for RoleModule {
    fn name(&self) -> &str {
        "role"
    }

    async fn legal_next_tokens(&self, ctx: &MessageContext, path: &CommandPath) -> BTreeSet<String> {
        match tokens(path).as_slice() {
            [] => BTreeSet::from(["role".to_string()]),
            ["role"] => ["give", "take", "list"].iter().map(|s| s.to_string()).collect(),
            ["role", "give"] => {
                let held = self.held_by(&ctx.author.id).await;
                self.roles.iter().filter(|r| !held.contains(*r)).cloned().collect()
            }
            ["role", "take"] => self.held_by(&ctx.author.id).await,
            _ => BTreeSet::new(),
        }
    }

    async fn execute(
        &self,
        ctx: &MessageContext,
        path: &CommandPath,
        remainder: &str,
    ) -> Result<Option<CommandResponse>> {
        let author = &ctx.author.id;
        let reply = match tokens(path).as_slice() {
            ["role", "give", role] => {
                self.held.write().await.entry(author.clone()).or_default().insert(role.to_string());
                CommandResponse::ok(format!("{} now has {}", ctx.author.display_name, role))
            }
            ["role", "take", role] => {
                if let Some(held) = self.held.write().await.get_mut(author) {
                    held.remove(*role);
                }
                CommandResponse::ok(format!("{} no longer has {}", ctx.author.display_name, role))
            }
            ["role", "list"] => {
                let held = self.held_by(author).await;
                let held: Vec<String> = held.into_iter().collect();
                CommandResponse::ephemeral(format!(
                    "Available: {}\nYours: {}",
                    self.roles.join(", "),
                    if held.is_empty() { "none".to_string() } else { held.join(", ") }
                ))
            }
            ["role", action @ ("give" | "take")] => {
                let wanted = if remainder.is_empty() { "<role>" } else { remainder };
                CommandResponse::ephemeral(format!("No role matching `{wanted}` you can {action}"))
            }
            ["role"] => CommandResponse::ephemeral("Usage: role <give|take|list> [role]"),
            _ => bail!("role does not handle `{}`", path),
        };
        Ok(Some(reply))
    }
}

// ---------------------------------------------------------------------------
// log
// ---------------------------------------------------------------------------

/// Chooses the channel moderation events are logged to.
pub struct LogModule {
    channels: Vec<String>,
    target: RwLock<Option<String>>,
}

impl LogModule {
    pub fn new(channels: Vec<String>) -> Self {
        Self { channels, target: RwLock::new(None) }
    }
}

#[async_trait]
impl Provider for LogModule {
    fn name(&self) -> &str {
        "log"
    }

    async fn legal_next_tokens(&self, _ctx: &MessageContext, path: &CommandPath) -> BTreeSet<String> {
        match tokens(path).as_slice() {
            [] => BTreeSet::from(["log".to_string()]),
            ["log"] => ["channel", "off", "status"].iter().map(|s| s.to_string()).collect(),
            ["log", "channel"] => self.channels.iter().cloned().collect(),
            _ => BTreeSet::new(),
        }
    }

    async fn execute(
        &self,
        _ctx: &MessageContext,
        path: &CommandPath,
        remainder: &str,
    ) -> Result<Option<CommandResponse>> {
        let reply = match tokens(path).as_slice() {
            ["log", "channel", channel] => {
                *self.target.write().await = Some(channel.to_string());
                CommandResponse::ok(format!("Logging to #{channel}"))
            }
            ["log", "channel"] => CommandResponse::ephemeral(format!(
                "Unknown channel `{}`. Known: {}",
                remainder,
                self.channels.join(", ")
            )),
            ["log", "off"] => {
                *self.target.write().await = None;
                CommandResponse::ok("Logging disabled")
            }
            ["log", "status"] | ["log"] => match self.target.read().await.as_deref() {
                Some(channel) => CommandResponse::ephemeral(format!("Logging to #{channel}")),
                None => CommandResponse::ephemeral("Logging is off"),
            },
            _ => bail!("log does not handle `{}`", path),
        };
        Ok(Some(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_commands::{CommandDispatcher, DispatchOutcome};

    async fn bot() -> CommandDispatcher {
        let registry = ProviderRegistry::new();
        let modules = ModulesConfig {
            roles: vec!["Moderator".into(), "Member".into(), "Event Host".into()],
            channels: vec!["mod-log".into(), "general".into()],
            filter_actions: vec!["delete".into(), "warn".into()],
        };
        register_all(&registry, &modules).await;
        CommandDispatcher::new(registry)
    }

    async fn say(d: &CommandDispatcher, author: &str, text: &str) -> String {
        let outcome = d.on_message(&MessageContext::console(author, text)).await.unwrap();
        match outcome {
            DispatchOutcome::Dispatched { response: Some(reply), .. } => reply.text,
            other => panic!("`{text}` gave {other:?}"),
        }
    }

    #[tokio::test]
    async fn filter_lifecycle() {
        let d = bot().await;
        assert_eq!(say(&d, "amy", "filt add del bad.*word").await, "Filtering `bad.*word` (delete)");
        assert_eq!(say(&d, "amy", "f test a badxword here").await, "Matches: `bad.*word` (delete)");
        assert_eq!(say(&d, "amy", "filter add warn").await, "Usage: filter add warn <regex>");
        assert_eq!(say(&d, "amy", "filter add").await, "Usage: filter add <delete|warn>");
        assert!(say(&d, "amy", "filter list").await.contains("bad.*word"));
        assert_eq!(say(&d, "amy", "filter rem bad.*word").await, "No longer filtering `bad.*word`");
        assert_eq!(say(&d, "amy", "filter list").await, "No filters configured");
    }

    #[tokio::test]
    async fn invalid_regex_is_rejected() {
        let d = bot().await;
        assert!(say(&d, "amy", "filter add warn (unclosed").await.starts_with("Invalid pattern"));
    }

    #[tokio::test]
    async fn role_options_follow_author_state() {
        let d = bot().await;
        assert_eq!(say(&d, "amy", "role give mod").await, "amy now has Moderator");
        assert_eq!(say(&d, "amy", "role give EH").await, "amy now has Event Host");
        // Moderator is no longer offered to amy, so "mod" stops resolving
        assert_eq!(say(&d, "amy", "role give mod").await, "No role matching `mod` you can give");
        // bob holds nothing
        assert_eq!(say(&d, "bob", "role take mod").await, "No role matching `mod` you can take");
        assert_eq!(say(&d, "amy", "role take m").await, "amy no longer has Moderator");
        assert!(say(&d, "amy", "role list").await.ends_with("Yours: Event Host"));
    }

    #[tokio::test]
    async fn log_channel_selection() {
        let d = bot().await;
        assert_eq!(say(&d, "amy", "log status").await, "Logging is off");
        assert_eq!(say(&d, "amy", "log ch mod").await, "Logging to #mod-log");
        assert_eq!(say(&d, "amy", "log").await, "Logging to #mod-log");
        assert!(say(&d, "amy", "log channel random").await.starts_with("Unknown channel `random`"));
        assert_eq!(say(&d, "amy", "log off").await, "Logging disabled");
    }

    #[tokio::test]
    async fn help_lists_bundled_modules() {
        let d = bot().await;
        let text = say(&d, "amy", "help").await;
        for module in ["filter", "role", "log"] {
            assert!(text.contains(&format!("• {module} — {module}")), "{text}");
        }
    }
}
