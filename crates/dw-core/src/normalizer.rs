//! Reduces a [`RawSnapshot`] to the latest event and the latest
//! error, and gates notifications so an unchanged row is announced once.
//!
//! Row numbering follows the DOCSIS event table convention: a higher index
//! is a more recent event. Nothing here checks that assumption against the
//! timestamps.

use std::collections::BTreeMap;

use crate::layout::ColumnLayout;
use crate::rules::Rules;
use crate::timestamp::normalize_timestamp;
use crate::types::{Channel, EventRecord, RawSnapshot};

// ---------------------------------------------------------------------------
// EventTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Row<'a> {
    time: &'a str,
    message: &'a str,
    priority: Option<&'a str>,
}

/// Complete rows of a snapshot: indices present in both the time and the
/// message column. Rows missing either are discarded.
#[derive(Debug, Clone)]
pub struct EventTable<'a> {
    rows: BTreeMap<u32, Row<'a>>,
}

impl<'a> EventTable<'a> {
    pub fn new(snapshot: &'a RawSnapshot, layout: &ColumnLayout) -> Self {
        let times = snapshot.column(&layout.time);
        let mut priorities = snapshot.column(&layout.priority);
        let rows = snapshot
            .column(&layout.message)
            .into_iter()
            .filter_map(|(index, message)| {
                let time = *times.get(&index)?;
                Some((
                    index,
                    Row {
                        time,
                        message,
                        priority: priorities.remove(&index),
                    },
                ))
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest-indexed row.
    pub fn latest(&self, rules: &Rules) -> Option<EventRecord> {
        let (&index, row) = self.rows.last_key_value()?;
        Some(build_record(index, row, rules))
    }

    /// Highest-indexed row that is warning/critical or mentions a trouble
    /// keyword. May be older than [`latest`](Self::latest).
    pub fn latest_error(&self, rules: &Rules) -> Option<EventRecord> {
        self.rows
            .iter()
            .rev()
            .map(|(&index, row)| build_record(index, row, rules))
            .find(|record| record.is_trouble)
    }

    /// All rows in index order.
    pub fn records(&self, rules: &Rules) -> Vec<EventRecord> {
        self.rows
            .iter()
            .map(|(&index, row)| build_record(index, row, rules))
            .collect()
    }
}

fn build_record(index: u32, row: &Row<'_>, rules: &Rules) -> EventRecord {
    let priority = rules.resolve_priority(row.priority, row.message);
    EventRecord {
        index,
        time_raw: row.time.to_string(),
        time_iso: normalize_timestamp(row.time),
        message: row.message.to_string(),
        priority,
        is_trouble: rules.is_trouble(row.message, priority),
    }
}

// ---------------------------------------------------------------------------
// NotificationState
// ---------------------------------------------------------------------------

/// Last announced signature per channel. Empty at startup, lives as long as
/// the polling session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    last_event_signature: Option<String>,
    last_error_signature: Option<String>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signature(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Event => self.last_event_signature.as_deref(),
            Channel::Error => self.last_error_signature.as_deref(),
        }
    }

    /// Returns `true` and records the signature if `record` differs from the
    /// last one announced on `channel`. A missing record or an empty message
    /// never notifies and leaves the state untouched.
    pub fn should_notify(&mut self, record: Option<&EventRecord>, channel: Channel) -> bool {
        let Some(record) = record else {
            return false;
        };
        if record.message.trim().is_empty() {
            return false;
        }

        let signature = record.signature();
        let slot = match channel {
            Channel::Event => &mut self.last_event_signature,
            Channel::Error => &mut self.last_error_signature,
        };
        if slot.as_deref() == Some(signature.as_str()) {
            return false;
        }
        *slot = Some(signature);
        true
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Owns the column layout, the rule tables and the notification state for
/// one polling session.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    layout: ColumnLayout,
    rules: Rules,
    state: NotificationState,
}

impl Normalizer {
    pub fn new(layout: ColumnLayout, rules: Rules) -> Self {
        Self {
            layout,
            rules,
            state: NotificationState::new(),
        }
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    pub fn table<'a>(&self, snapshot: &'a RawSnapshot) -> EventTable<'a> {
        EventTable::new(snapshot, &self.layout)
    }

    /// The most recent complete row, or `None` if no index has both a time
    /// and a message.
    pub fn derive_latest_event(&self, snapshot: &RawSnapshot) -> Option<EventRecord> {
        self.table(snapshot).latest(&self.rules)
    }

    /// The most recent warning/critical/trouble row.
    pub fn derive_latest_error(&self, snapshot: &RawSnapshot) -> Option<EventRecord> {
        self.table(snapshot).latest_error(&self.rules)
    }

    pub fn should_notify(&mut self, record: Option<&EventRecord>, channel: Channel) -> bool {
        self.state.should_notify(record, channel)
    }
}
