//! Test builders: ergonomic constructors for snapshots and records.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use dw_core::{ColumnLayout, EventRecord, Priority, RawSnapshot};

// ---------------------------------------------------------------------------
// SnapshotBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`RawSnapshot`] fixtures laid out on the DOCSIS event
/// table columns.
///
/// # Example
///
/// ```rust
/// let snapshot = SnapshotBuilder::new()
///     .row(1, "2025-10-06 16:18:40", "Cable Modem Reboot")
///     .row_with_priority(2, "2025-10-06 16:20:00", "T3 time-out", "warning")
///     .build();
/// ```
#[derive(Default)]
pub struct SnapshotBuilder {
    layout: ColumnLayout,
    snapshot: RawSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(self, index: u32, time: &str, message: &str) -> Self {
        self.time(index, time).message(index, message)
    }

    pub fn row_with_priority(self, index: u32, time: &str, message: &str, priority: &str) -> Self {
        self.row(index, time, message).priority(index, priority)
    }

    pub fn time(mut self, index: u32, time: &str) -> Self {
        let key = self.layout.time_key(index);
        self.snapshot.insert(key, time);
        self
    }

    pub fn message(mut self, index: u32, message: &str) -> Self {
        let key = self.layout.message_key(index);
        self.snapshot.insert(key, message);
        self
    }

    pub fn priority(mut self, index: u32, priority: &str) -> Self {
        let key = self.layout.priority_key(index);
        self.snapshot.insert(key, priority);
        self
    }

    /// Unrelated key, e.g. another status field from the same page.
    pub fn key(mut self, key: &str, value: &str) -> Self {
        self.snapshot.insert(key, value);
        self
    }

    pub fn build(self) -> RawSnapshot {
        self.snapshot
    }
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// A record with a parseable time and no trouble flag unless the priority
/// says otherwise.
pub fn record(index: u32, message: &str, priority: Priority) -> EventRecord {
    EventRecord {
        index,
        time_raw: "2025-10-06 16:18:40".to_string(),
        time_iso: Some("2025-10-06T16:18:40+00:00".to_string()),
        message: message.to_string(),
        priority,
        is_trouble: priority.is_error(),
    }
}
