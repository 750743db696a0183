//! Console messaging surface: replies go to stdout, one line per reply line.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use warden_core::{MessageContext, MessagingSurface, OutboundReply, SurfaceError};

use crate::terminal_output::{format_error, format_reply};

pub struct ConsoleSurface {
    out: Mutex<Stdout>,
    color: bool,
}

impl ConsoleSurface {
    pub fn new(color: bool) -> Self {
        Self { out: Mutex::new(tokio::io::stdout()), color }
    }

    async fn write_line(&self, line: String) -> Result<(), SurfaceError> {
        let mut out = self.out.lock().await;
        let write = async {
            out.write_all(line.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await
        };
        write.await.map_err(surface_error)
    }
}

/// A broken pipe means nobody is reading stdout any more.
fn surface_error(e: io::Error) -> SurfaceError {
    match e.kind() {
        io::ErrorKind::BrokenPipe => SurfaceError::ChannelClosed("console".into()),
        _ => SurfaceError::SendFailed { channel: "console".into(), message: e.to_string() },
    }
}

#[async_trait]
impl MessagingSurface for ConsoleSurface {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, reply: OutboundReply) -> Result<(), SurfaceError> {
        self.write_line(format_reply(&reply.in_reply_to, &reply.text, reply.ephemeral, self.color))
            .await
    }

    async fn report_failure(&self, _ctx: &MessageContext, message: &str) -> Result<(), SurfaceError> {
        self.write_line(format_error(message, self.color)).await
    }
}
