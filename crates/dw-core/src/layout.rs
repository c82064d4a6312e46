//! Column addressing for the modem event table.
//!
//! Every value in a [`RawSnapshot`](crate::RawSnapshot) lives under
//! `{column}.{row}`. The defaults are the `docsDevEventTable` columns from
//! DOCS-CABLE-DEVICE-MIB.

use serde::Deserialize;

/// `docsDevEvFirstTime`
pub const DOCSIS_EVENT_TIME: &str = "1.3.6.1.2.1.69.1.5.8.1.2";
/// `docsDevEvLevel`
pub const DOCSIS_EVENT_LEVEL: &str = "1.3.6.1.2.1.69.1.5.8.1.5";
/// `docsDevEvText`
pub const DOCSIS_EVENT_TEXT: &str = "1.3.6.1.2.1.69.1.5.8.1.7";

/// Column prefixes for the time, message and priority families.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnLayout {
    pub time: String,
    pub message: String,
    pub priority: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            time: DOCSIS_EVENT_TIME.to_string(),
            message: DOCSIS_EVENT_TEXT.to_string(),
            priority: DOCSIS_EVENT_LEVEL.to_string(),
        }
    }
}

impl ColumnLayout {
    pub fn time_key(&self, index: u32) -> String {
        format!("{}.{index}", self.time)
    }

    pub fn message_key(&self, index: u32) -> String {
        format!("{}.{index}", self.message)
    }

    pub fn priority_key(&self, index: u32) -> String {
        format!("{}.{index}", self.priority)
    }

    /// True if `key` addresses a row of the time or message column.
    pub fn is_event_key(&self, key: &str) -> bool {
        [&self.time, &self.message].into_iter().any(|prefix| {
            key.strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|index| index.parse::<u32>().is_ok())
        })
    }

    /// Keys to request for rows `1..=rows`, time and message columns first.
    pub fn keys(&self, rows: u32, include_priority: bool) -> Vec<String> {
        let mut keys: Vec<String> = (1..=rows)
            .map(|i| self.time_key(i))
            .chain((1..=rows).map(|i| self.message_key(i)))
            .collect();
        if include_priority {
            keys.extend((1..=rows).map(|i| self.priority_key(i)));
        }
        keys
    }
}
