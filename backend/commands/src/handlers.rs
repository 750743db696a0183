/// Built-in providers.
///
/// `TreeProvider` covers feature modules whose vocabulary is a fixed tree of
/// words; `HelpProvider` lists what every other registered provider accepts.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use warden_core::MessageContext;

use crate::path::CommandPath;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;
use crate::types::{CommandInvocation, CommandResponse};

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Runs a resolved command for a `TreeProvider`.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &MessageContext, inv: &CommandInvocation) -> Result<CommandResponse>;
}

// ---------------------------------------------------------------------------
// Tree provider
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TokenNode {
    children: BTreeMap<String, TokenNode>,
    /// A declared command ends here.
    terminal: bool,
}

impl TokenNode {
    fn find(&self, path: &CommandPath) -> Option<&TokenNode> {
        path.tokens().iter().try_fold(self, |node, token| node.children.get(token))
    }
}

/// A provider whose command paths are declared up front.
///
/// ```ignore
/// TreeProvider::new("filter", handler)
///     .command("filter add")
///     .command("filter remove")
///     .command("filter list");
/// ```
pub struct TreeProvider {
    name: String,
    root: TokenNode,
    handler: Arc<dyn CommandHandler>,
}

impl TreeProvider {
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self { name: name.into(), root: TokenNode::default(), handler }
    }

    /// Declare a command from whitespace-separated words.
    pub fn command(self, words: &str) -> Self {
        self.command_tokens(words.split_whitespace())
    }

    /// Declare a command whose tokens may themselves contain spaces.
    pub fn command_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = &mut self.root;
        for token in tokens {
            node = node.children.entry(token.into()).or_default();
        }
        node.terminal = true;
        self
    }

    fn usage(&self, path: &CommandPath, node: &TokenNode) -> String {
        let next: Vec<&str> = node.children.keys().map(String::as_str).collect();
        let prefix = if path.is_empty() { String::new() } else { format!("{} ", path) };
        format!("Usage: {}<{}>", prefix, next.join("|"))
    }
}

#[async_trait]
impl Provider for TreeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn legal_next_tokens(&self, _ctx: &MessageContext, path: &CommandPath) -> BTreeSet<String> {
        self.root
            .find(path)
            .map(|node| node.children.keys().cloned().collect())
            .unwrap_or_default()
    }

    async fn execute(
        &self,
        ctx: &MessageContext,
        path: &CommandPath,
        remainder: &str,
    ) -> Result<Option<CommandResponse>> {
        let Some(node) = self.root.find(path) else {
            anyhow::bail!("{} does not declare `{}`", self.name, path);
        };
        if !node.terminal {
            return Ok(Some(CommandResponse::ephemeral(self.usage(path, node))));
        }
        let inv = CommandInvocation { path: path.clone(), remainder: remainder.to_string() };
        self.handler.handle(ctx, &inv).await.map(Some)
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

pub const HELP_TOKEN: &str = "help";

/// Owns `help`; replies with the root words of every other provider.
pub struct HelpProvider {
    registry: ProviderRegistry,
}

impl HelpProvider {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Provider for HelpProvider {
    fn name(&self) -> &str {
        "help"
    }

    async fn legal_next_tokens(&self, _ctx: &MessageContext, path: &CommandPath) -> BTreeSet<String> {
        if path.is_empty() {
            BTreeSet::from([HELP_TOKEN.to_string()])
        } else {
            BTreeSet::new()
        }
    }

    async fn execute(
        &self,
        ctx: &MessageContext,
        _path: &CommandPath,
        _remainder: &str,
    ) -> Result<Option<CommandResponse>> {
        let root = CommandPath::root();
        let mut lines = vec!["*Available commands:*".to_string()];
        for provider in self.registry.snapshot().await {
            if std::ptr::addr_eq(Arc::as_ptr(&provider), self as *const Self) {
                continue;
            }
            let words = provider.legal_next_tokens(ctx, &root).await;
            if words.is_empty() {
                continue;
            }
            let words: Vec<String> = words.into_iter().collect();
            lines.push(format!("• {} — {}", provider.name(), words.join(", ")));
        }
        info!("[Help] Listed {} providers for {}", lines.len() - 1, ctx.author.id);
        Ok(Some(CommandResponse::ephemeral(lines.join("\n"))))
    }
}
