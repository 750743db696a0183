/// Provider trait: the contract every feature module implements.
use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use warden_core::MessageContext;

use crate::path::CommandPath;
use crate::types::CommandResponse;

/// A feature module that owns part of the command vocabulary.
///
/// The dispatcher asks each provider for the legal next tokens after the path
/// resolved so far, and calls `execute` on the one provider left owning the
/// final path. `legal_next_tokens` is called at most once per path per
/// message, so it may read mutable state (configured role names, ...) as long
/// as its answer is consistent within that message.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name for logging and defect reports.
    fn name(&self) -> &str;

    /// Tokens that may follow `path`. Empty means either "the rest is free
    /// text" or "this path is not mine".
    async fn legal_next_tokens(&self, ctx: &MessageContext, path: &CommandPath) -> BTreeSet<String>;

    /// Run the command at `path` with the remaining free text.
    async fn execute(
        &self,
        ctx: &MessageContext,
        path: &CommandPath,
        remainder: &str,
    ) -> Result<Option<CommandResponse>>;
}
