use thiserror::Error;

/// Errors raised by a messaging surface while delivering replies.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The channel can no longer be written to; later sends will fail too.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("send failed on {channel}: {message}")]
    SendFailed { channel: String, message: String },
}
