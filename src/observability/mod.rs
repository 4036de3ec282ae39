//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RuntimeConfig
//!     → logger.rs (threshold, format, redaction, base fields)
//!     → Logger ──child()──▶ component / database / auth / audit loggers
//!                 │
//!                 ├── timer.rs   (operation durations)
//!                 ├── audit.rs   (security events)
//!                 └── errors.rs  (normalized failures)
//!     → record.rs (merge, strip unset)
//!     → redaction.rs (production only)
//!     → format.rs (JSON line / pretty line)
//!     → sink.rs (stdout, memory, tracing bridge)
//! ```
//!
//! # Design Decisions
//! - A single sink per logger family; children never own one
//! - Everything is synchronous; a record is one write of one line
//! - Framework diagnostics go through `tracing` (tracing.rs), separately

pub mod audit;
pub mod clock;
pub mod errors;
pub mod format;
pub mod level;
pub mod logger;
pub mod record;
pub mod redaction;
pub mod sink;
pub mod timer;
pub mod tracing;

pub use audit::AuditTrail;
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::NormalizedError;
pub use format::{Formatter, LogFormat};
pub use level::{ConfigurationError, LogLevel, Threshold};
pub use logger::{create_logger, Logger, LoggerBuilder};
pub use record::{fields, Entry, Fields, Record};
pub use redaction::RedactionRules;
pub use sink::{DiscardSink, MemorySink, Sink, StdoutSink, TracingSink};
pub use timer::Timer;
