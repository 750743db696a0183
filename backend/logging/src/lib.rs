//! Structured logging for Warden.
//!
//! Console and rolling NDJSON output, dispatch event records, and redaction of
//! user-supplied text before it reaches a log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{DispatchEvent, DispatchEventLogger, EventLogEntry};
pub use logger::{LoggerOptions, init_logger};
pub use redact::redact_sensitive_data;
