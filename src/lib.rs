//! docsis-watch: cable modem DOCSIS event-log watcher.
//!
//! Polls the modem's event table on an interval, reduces each snapshot to
//! the latest event and latest error, and announces each of them once.
//!
//! # Architecture
//!
//! ```text
//! SnapshotSource ──► Coordinator ──► Normalizer ──► EventSink
//!  (HTTP / SNMP)          │
//!                         └──► Summary / diagnostics
//! ```
//!
//! The binary wires these together; integration tests drive the
//! [`coordinator::Coordinator`] directly with fake sources.

pub mod coordinator;
pub mod sink;

pub use coordinator::Coordinator;
pub use sink::{EventSink, LogbookSink, Notification};
