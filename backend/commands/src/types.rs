/// Reply and outcome types shared by providers and the dispatcher.
use serde::{Deserialize, Serialize};

use crate::path::CommandPath;

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// The result returned by a provider: the text reply to send back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub text: String,
    pub ephemeral: bool, // only visible to the invoker
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: false }
    }
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true }
    }
}

// ---------------------------------------------------------------------------
// Resolved invocation
// ---------------------------------------------------------------------------

/// A fully resolved command as seen by a handler.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub path: CommandPath,
    /// Free text following the last resolved token.
    pub remainder: String,
}

impl CommandInvocation {
    /// Remainder split on whitespace.
    pub fn args(&self) -> Vec<&str> {
        self.remainder.split_whitespace().collect()
    }
}

// ---------------------------------------------------------------------------
// Walk and dispatch results
// ---------------------------------------------------------------------------

/// Where a walk over one message's text stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: CommandPath,
    pub remainder: String,
    /// Names of the providers alive at `path`.
    pub owners: Vec<String>,
}

/// Successful end of a dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing resolved: the message is not a command.
    Ignored,
    /// Exactly one provider owned the path and executed it.
    Dispatched {
        provider: String,
        path: CommandPath,
        remainder: String,
        response: Option<CommandResponse>,
    },
}

impl DispatchOutcome {
    pub fn response(&self) -> Option<&CommandResponse> {
        match self {
            DispatchOutcome::Dispatched { response, .. } => response.as_ref(),
            DispatchOutcome::Ignored => None,
        }
    }
}
