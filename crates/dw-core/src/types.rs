//! Core types for dw-core.
//!
//! This module defines the data structures shared across every layer: the
//! [`RawSnapshot`] produced by a feed on each poll, the derived
//! [`EventRecord`], its [`Priority`], the notification [`Channel`], and the
//! [`Summary`] handed to presentation code.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::ColumnLayout;

// ---------------------------------------------------------------------------
// RawSnapshot
// ---------------------------------------------------------------------------

/// Opaque key → value mapping fetched from the modem on every poll.
///
/// Keys are column identifiers with a trailing row index (for the DOCSIS
/// event table, `1.3.6.1.2.1.69.1.5.8.1.7.4` is the message of row 4).
/// Nothing in a snapshot persists across polls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawSnapshot(BTreeMap<String, String>);

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Collect one column family as `row index → value`.
    ///
    /// Only keys of the exact form `{prefix}.{index}` are considered. Empty
    /// values are absent; whitespace-only values are present and come back
    /// trimmed to `""`.
    pub fn column(&self, prefix: &str) -> BTreeMap<u32, &str> {
        self.0
            .iter()
            .filter_map(|(key, value)| {
                let index = key
                    .strip_prefix(prefix)?
                    .strip_prefix('.')?
                    .parse::<u32>()
                    .ok()?;
                (!value.is_empty()).then_some((index, value.trim()))
            })
            .collect()
    }

    /// Lay extracted rows out under `layout`, numbering them `1..=N` in the
    /// order given.
    pub fn from_rows(rows: &[crate::extract::ExtractedRow], layout: &ColumnLayout) -> Self {
        let mut snapshot = Self::new();
        for (i, row) in rows.iter().enumerate() {
            let index = i as u32 + 1;
            snapshot.insert(layout.time_key(index), row.time.clone());
            snapshot.insert(layout.message_key(index), row.message.clone());
            if let Some(priority) = &row.priority {
                snapshot.insert(layout.priority_key(index), priority.clone());
            }
        }
        snapshot
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Priority / Channel
// ---------------------------------------------------------------------------

/// Event severity, normalised across modem firmwares.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Notice,
    Warning,
    Critical,
}

impl Priority {
    /// Warning and critical events count as errors.
    pub fn is_error(self) -> bool {
        matches!(self, Priority::Warning | Priority::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Notice => "notice",
            Priority::Warning => "warning",
            Priority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which announcement stream a record is checked against for duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Event,
    Error,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Event => write!(f, "event"),
            Channel::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// One row of the modem event log, recomputed from the snapshot on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Row index in the source table. Higher means more recent.
    pub index: u32,
    /// Timestamp exactly as the modem reported it.
    pub time_raw: String,
    /// UTC ISO-8601 rendering of `time_raw`, or `None` when it could not be parsed.
    pub time_iso: Option<String>,
    /// Event text, trimmed.
    pub message: String,
    pub priority: Priority,
    /// True for warning/critical events and for messages carrying a known
    /// trouble keyword.
    pub is_trouble: bool,
}

impl EventRecord {
    /// Change-detection key. Two records with the same signature are the same
    /// announcement.
    pub fn signature(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.index,
            self.message.trim(),
            self.time_iso.as_deref().unwrap_or(""),
            self.priority
        )
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Overall state of the event log as seen by the last polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No poll has succeeded yet.
    Unavailable,
    /// The last successful poll found no complete event row.
    NoEvents,
    Events,
}

/// The view consumed by presentation code (status line, sensors, logbook).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub status: Status,
    /// Whether the most recent poll reached the modem.
    pub reachable: bool,
    /// Whether the latest event indicates a connectivity problem.
    pub trouble: bool,
    pub last_event: Option<EventRecord>,
    pub last_error: Option<EventRecord>,
    /// Time of the most recent successful poll.
    pub last_success: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn unavailable() -> Self {
        Self {
            status: Status::Unavailable,
            reachable: false,
            trouble: false,
            last_event: None,
            last_error: None,
            last_success: None,
        }
    }

    pub fn from_records(
        last_event: Option<EventRecord>,
        last_error: Option<EventRecord>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: if last_event.is_some() {
                Status::Events
            } else {
                Status::NoEvents
            },
            reachable: true,
            trouble: last_event.as_ref().is_some_and(|e| e.is_trouble),
            last_event,
            last_error,
            last_success: Some(at),
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::unavailable()
    }
}
