//! Observability
//!
//! - Typed event codes attached to every log line
//! - `tracing` for emission, `tracing-subscriber` for output (binary only)
//!
//! Per-parameter validation failures are logged here with their full reason;
//! callers of `apply` only ever see the list of offending names.

mod events;
mod logger;

pub use events::Event;
pub use logger::{LogFormat, LoggingConfig};
