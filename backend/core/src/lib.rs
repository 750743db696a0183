pub mod error;
pub mod message;
pub mod traits;

pub use error::SurfaceError;
pub use message::{AuthorRef, ChannelRef, MessageContext};
pub use traits::{MessagingSurface, OutboundReply};
