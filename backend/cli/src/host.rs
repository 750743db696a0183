//! Per-message glue between a messaging surface and the dispatcher.

use tracing::error;
use warden_commands::{CommandDispatcher, DispatchOutcome};
use warden_core::{MessageContext, MessagingSurface, OutboundReply};

/// Dispatch one message and deliver whatever comes out of it. Never fails:
/// every error ends up in the log and, where it concerns the user, on the
/// surface.
pub async fn handle_message(
    dispatcher: &CommandDispatcher,
    surface: &dyn MessagingSurface,
    ctx: MessageContext,
) {
    let delivered = match dispatcher.on_message(&ctx).await {
        Ok(DispatchOutcome::Dispatched { response: Some(reply), .. }) => {
            surface.send(OutboundReply::to(&ctx, reply.text, reply.ephemeral)).await
        }
        Ok(_) => Ok(()),
        Err(e) if e.is_defect() => {
            surface
                .report_failure(&ctx, &format!("internal error while handling `{}`; the operator has been notified", e.path()))
                .await
        }
        Err(e) => surface.report_failure(&ctx, &e.to_string()).await,
    };
    if let Err(e) = delivered {
        error!(surface = surface.name(), message_id = %ctx.id, "Failed to deliver reply: {}", e);
    }
}
