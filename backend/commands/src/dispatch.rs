/// Command dispatch: walk a message's text token by token and route the
/// resolved command to the one provider that owns it.
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use warden_core::MessageContext;
use warden_logging::{DispatchEvent, DispatchEventLogger};

use crate::error::DispatchError;
use crate::matcher::resolve;
use crate::path::CommandPath;
use crate::provider::Provider;
use crate::registry::{Aggregator, ProviderRegistry};
use crate::session::{InvocationSession, ProviderId};
use crate::types::{DispatchOutcome, Resolution};

/// Host-level knobs. The engine itself never cancels anything.
#[derive(Debug, Clone, Default)]
pub struct DispatcherOptions {
    /// Upper bound on a single provider `execute`.
    pub execute_timeout: Option<Duration>,
}

/// Entry point for inbound messages. Cheap to clone; every clone shares the
/// same registry, and each call runs an independent dispatch cycle.
#[derive(Clone)]
pub struct CommandDispatcher {
    registry: ProviderRegistry,
    options: DispatcherOptions,
}

impl CommandDispatcher {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry, options: DispatcherOptions::default() }
    }

    pub fn with_options(mut self, options: DispatcherOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Walk `text` without executing anything.
    pub async fn resolve_path(&self, ctx: &MessageContext, text: &str) -> Resolution {
        let aggregator = Aggregator::new(self.registry.snapshot().await);
        let mut session = InvocationSession::new();
        let (path, remainder) = walk(&aggregator, &mut session, ctx, text).await;
        let owners = aggregator.names(session.survivors(&path).unwrap_or_default());
        Resolution { path, remainder, owners }
    }

    /// Run one full dispatch cycle for `ctx.content`.
    pub async fn on_message(&self, ctx: &MessageContext) -> Result<DispatchOutcome, DispatchError> {
        let message_id = ctx.id.to_string();
        let aggregator = Aggregator::new(self.registry.snapshot().await);
        let (path, remainder, survivors) = {
            let mut session = InvocationSession::new();
            let (path, remainder) = walk(&aggregator, &mut session, ctx, &ctx.content).await;
            let survivors = session.survivors(&path).unwrap_or_default().to_vec();
            (path, remainder, survivors)
        };

        if path.is_empty() {
            debug!("[Dispatch] {} is not a command", message_id);
            DispatchEventLogger::log_event(&message_id, DispatchEvent::Ignored);
            return Ok(DispatchOutcome::Ignored);
        }

        let provider =
            owner(&aggregator, &path, &survivors).map_err(|err| report_defect(&message_id, err))?;

        let name = provider.name().to_string();
        info!("[Dispatch] `{}` → {} in channel {}", path, name, ctx.channel.name);

        let run = provider.execute(ctx, &path, &remainder);
        let timed = match self.options.execute_timeout {
            Some(after) => tokio::time::timeout(after, run).await.map_err(|_| after),
            None => Ok(run.await),
        };
        let result = match timed {
            Ok(result) => result,
            Err(after) => {
                let err = DispatchError::Timeout { provider: name, path, after };
                return Err(report_failure(&message_id, err));
            }
        };

        match result {
            Ok(response) => {
                DispatchEventLogger::log_event(
                    &message_id,
                    DispatchEvent::Dispatched {
                        provider: name.clone(),
                        path: path.to_string(),
                        remainder: remainder.clone(),
                    },
                );
                Ok(DispatchOutcome::Dispatched { provider: name, path, remainder, response })
            }
            Err(cause) => Err(report_failure(
                &message_id,
                DispatchError::Execution { provider: name, path, cause },
            )),
        }
    }
}

/// The one provider alive at a non-empty final path.
fn owner(
    aggregator: &Aggregator,
    path: &CommandPath,
    survivors: &[ProviderId],
) -> Result<Arc<dyn Provider>, DispatchError> {
    match survivors {
        [only] => aggregator
            .provider(*only)
            .cloned()
            .ok_or_else(|| DispatchError::OrphanedPath { path: path.clone() }),
        [] => Err(DispatchError::OrphanedPath { path: path.clone() }),
        many => Err(DispatchError::AmbiguousOwner { path: path.clone(), providers: aggregator.names(many) }),
    }
}

/// WALKING → DONE. Stops at the first token that does not resolve or when no
/// options remain; everything from there on is the remainder.
async fn walk(
    aggregator: &Aggregator,
    session: &mut InvocationSession,
    ctx: &MessageContext,
    text: &str,
) -> (CommandPath, String) {
    let mut path = CommandPath::root();
    let mut rest = text.trim();
    loop {
        let options = aggregator.legal_next_tokens(session, ctx, &path).await;
        if options.is_empty() {
            break;
        }
        let Some((token, after)) = next_token(rest) else {
            break;
        };
        let Some(resolved) = resolve(token, &options) else {
            debug!("[Dispatch] `{}` does not resolve after `{}`", DispatchEventLogger::scrub(token), path);
            break;
        };
        debug!("[Dispatch] `{}` → `{}`", DispatchEventLogger::scrub(token), resolved);
        path = path.child(resolved);
        rest = after;
    }
    (path, rest.to_string())
}

/// Split off the first whitespace-delimited token of already-trimmed text.
fn next_token(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (text, ""),
    })
}

fn report_defect(message_id: &str, err: DispatchError) -> DispatchError {
    error!("[Dispatch] {}", DispatchEventLogger::scrub(&err.to_string()));
    let providers = match &err {
        DispatchError::AmbiguousOwner { providers, .. } => providers.clone(),
        _ => Vec::new(),
    };
    DispatchEventLogger::log_event(
        message_id,
        DispatchEvent::Defect {
            path: err.path().to_string(),
            providers,
            error_msg: err.to_string(),
        },
    );
    err
}

fn report_failure(message_id: &str, err: DispatchError) -> DispatchError {
    warn!("[Dispatch] {}", DispatchEventLogger::scrub(&err.to_string()));
    let provider = match &err {
        DispatchError::Execution { provider, .. } | DispatchError::Timeout { provider, .. } => {
            provider.clone()
        }
        _ => String::new(),
    };
    DispatchEventLogger::log_event(
        message_id,
        DispatchEvent::ExecutionFailed {
            provider,
            path: err.path().to_string(),
            error_msg: err.to_string(),
        },
    );
    err
}
