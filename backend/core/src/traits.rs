use async_trait::async_trait;

use crate::error::SurfaceError;
use crate::message::{ChannelRef, MessageContext};

/// A reply to be delivered back to the channel a message came from.
#[derive(Debug, Clone)]
pub struct OutboundReply {
    pub channel: ChannelRef,
    /// Author the reply is addressed to; only they see it when `ephemeral` is set.
    pub in_reply_to: String,
    pub text: String,
    pub ephemeral: bool,
}

impl OutboundReply {
    pub fn to(ctx: &MessageContext, text: impl Into<String>, ephemeral: bool) -> Self {
        Self {
            channel: ctx.channel.clone(),
            in_reply_to: ctx.author.id.clone(),
            text: text.into(),
            ephemeral,
        }
    }
}

/// The chat transport binding. Receives raw messages elsewhere; the dispatch
/// engine's host only needs it to send replies and report failures.
#[async_trait]
pub trait MessagingSurface: Send + Sync {
    /// Human-readable surface name for logging.
    fn name(&self) -> &str;

    /// Deliver a reply.
    async fn send(&self, reply: OutboundReply) -> Result<(), SurfaceError>;

    /// Surface a failure to the user/operator. Defaults to an ephemeral reply.
    async fn report_failure(&self, ctx: &MessageContext, message: &str) -> Result<(), SurfaceError> {
        self.send(OutboundReply::to(ctx, message, true)).await
    }
}
