use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a message was posted (guild channel, DM, console, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub display_name: String,
}

/// A single user-authored text message as handed to the dispatch engine.
///
/// The engine only reads `content` and uses `id` for log correlation; the rest
/// is passed through untouched to whichever provider ends up owning the command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContext {
    pub id: Uuid,
    pub channel: ChannelRef,
    pub author: AuthorRef,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl MessageContext {
    pub fn new(channel: ChannelRef, author: AuthorRef, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            author,
            content: content.into(),
            received_at: Utc::now(),
        }
    }

    /// Convenience constructor for tests and the console surface.
    pub fn console(author: &str, content: impl Into<String>) -> Self {
        Self::new(
            ChannelRef { id: "console".into(), name: "console".into() },
            AuthorRef { id: author.into(), display_name: author.into() },
            content,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_messages_get_distinct_ids() {
        let a = MessageContext::console("alice", "filter list");
        let b = MessageContext::console("alice", "filter list");
        assert_ne!(a.id, b.id);
        assert_eq!(a.channel.id, "console");
        assert_eq!(a.author.display_name, "alice");
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = MessageContext::console("bob", "role give Moderator");
        let json = serde_json::to_string(&msg).unwrap();
        let back: MessageContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, msg.id);
        assert_eq!(back.content, "role give Moderator");
    }
}
