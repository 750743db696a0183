//! Ambiguous command resolution and multi-provider dispatch.
//!
//! A message's text is consumed one whitespace-delimited token at a time. At
//! each step every registered [`Provider`] still in the running declares the
//! tokens it accepts next; the typed token (possibly abbreviated) is resolved
//! against their union by [`matcher::resolve`]. When no further token
//! resolves, the one provider left owning the path executes it with the rest
//! of the text.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod path;
pub mod provider;
pub mod registry;
pub mod session;
pub mod types;

pub use dispatch::{CommandDispatcher, DispatcherOptions};
pub use error::DispatchError;
pub use handlers::{CommandHandler, HelpProvider, TreeProvider};
pub use matcher::{resolve, MIN_SUBSEQUENCE_LEN};
pub use path::CommandPath;
pub use provider::Provider;
pub use registry::{Aggregator, ProviderRegistry};
pub use session::{InvocationSession, PathEntry, ProviderId};
pub use types::{CommandInvocation, CommandResponse, DispatchOutcome, Resolution};
