//! Dispatch Event Logger
//!
//! One structured record per dispatch cycle, emitted on the `dispatch_events`
//! target so the JSON file layer writes it as NDJSON.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

static REDACT: AtomicBool = AtomicBool::new(true);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DispatchEvent {
    /// The message did not start with a command.
    Ignored,
    Dispatched {
        provider: String,
        path: String,
        remainder: String,
    },
    /// Engine or registration defect (orphaned path, several owners).
    Defect {
        path: String,
        providers: Vec<String>,
        error_msg: String,
    },
    ExecutionFailed {
        provider: String,
        path: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: DispatchEvent,
}

pub struct DispatchEventLogger;

impl DispatchEventLogger {
    /// Toggle redaction of free text in subsequent events (on by default).
    pub fn set_redaction(enabled: bool) {
        REDACT.store(enabled, Ordering::Relaxed);
    }

    pub fn redaction_enabled() -> bool {
        REDACT.load(Ordering::Relaxed)
    }

    /// User-supplied text as it may appear in any log line.
    pub fn scrub(text: &str) -> String {
        if Self::redaction_enabled() {
            redact_sensitive_data(text)
        } else {
            text.to_string()
        }
    }

    /// Build the entry for an event, redacting free text if enabled.
    pub fn entry(message_id: &str, mut event: DispatchEvent) -> EventLogEntry {
        if Self::redaction_enabled() {
            match &mut event {
                DispatchEvent::Dispatched { remainder, .. } => {
                    *remainder = redact_sensitive_data(remainder);
                }
                DispatchEvent::Defect { error_msg, .. } | DispatchEvent::ExecutionFailed { error_msg, .. } => {
                    *error_msg = redact_sensitive_data(error_msg);
                }
                DispatchEvent::Ignored => {}
            }
        }
        EventLogEntry {
            message_id: message_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(message_id: &str, event: DispatchEvent) {
        let entry = Self::entry(message_id, event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "dispatch_events", event = %json, "Dispatch event"),
            Err(_) => info!(target: "dispatch_events", event = ?entry, "Dispatch event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_is_redacted() {
        let entry = DispatchEventLogger::entry(
            "m1",
            DispatchEvent::Dispatched {
                provider: "filter".into(),
                path: "filter add".into(),
                remainder: "someone@example.com".into(),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "Dispatched");
        assert_eq!(json["event"]["remainder"], "[REDACTED_EMAIL]");
        assert_eq!(json["message_id"], "m1");
    }

    #[test]
    fn test_scrub_covers_plain_log_text() {
        assert!(DispatchEventLogger::redaction_enabled());
        assert_eq!(
            DispatchEventLogger::scrub("provider filter failed: cannot mail admin@example.com"),
            "provider filter failed: cannot mail [REDACTED_EMAIL]"
        );
        assert_eq!(DispatchEventLogger::scrub("filter add"), "filter add");
    }
}
