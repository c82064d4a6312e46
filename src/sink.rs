//! Where announcements go once the normalizer decides a record is new.

use dw_core::{Channel, EventRecord, Priority};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub const EVENT_NAME: &str = "docsis_watch_event";
pub const ERROR_NAME: &str = "docsis_watch_error";

pub fn event_name(channel: Channel) -> &'static str {
    match channel {
        Channel::Event => EVENT_NAME,
        Channel::Error => ERROR_NAME,
    }
}

/// Logbook line: `"{PRIORITY}: {message} ({time})"`.
///
/// Blank parts are left out. A blank priority reads as `NOTICE` unless
/// nothing else is present, in which case the line is just `"Event"`.
pub fn logbook_message(priority: &str, message: &str, time: &str) -> String {
    let (priority, message, time) = (priority.trim(), message.trim(), time.trim());
    if priority.is_empty() && message.is_empty() && time.is_empty() {
        return "Event".to_string();
    }

    let mut parts = Vec::with_capacity(3);
    parts.push(if priority.is_empty() {
        "NOTICE:".to_string()
    } else {
        format!("{}:", priority.to_uppercase())
    });
    if !message.is_empty() {
        parts.push(message.to_string());
    }
    if !time.is_empty() {
        parts.push(format!("({time})"));
    }
    parts.join(" ")
}

/// Payload of one announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub name: &'static str,
    pub channel: Channel,
    pub index: u32,
    pub message: String,
    /// Normalised time, or `None` when the modem's timestamp did not parse.
    pub time: Option<String>,
    pub priority: Priority,
}

impl Notification {
    pub fn new(record: &EventRecord, channel: Channel) -> Self {
        Self {
            name: event_name(channel),
            channel,
            index: record.index,
            message: record.message.trim().to_string(),
            time: record.time_iso.clone(),
            priority: record.priority,
        }
    }

    pub fn text(&self) -> String {
        logbook_message(
            self.priority.as_str(),
            &self.message,
            self.time.as_deref().unwrap_or(""),
        )
    }
}

/// Receives each record that passed the per-channel duplicate check.
pub trait EventSink: Send + Sync {
    fn on_new_event(&self, record: &EventRecord, channel: Channel);
}

/// Writes announcements to the tracing log. Errors are logged at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogbookSink;

impl EventSink for LogbookSink {
    fn on_new_event(&self, record: &EventRecord, channel: Channel) {
        let notification = Notification::new(record, channel);
        let text = notification.text();
        match channel {
            Channel::Event => info!(event = notification.name, index = record.index, "{text}"),
            Channel::Error => warn!(event = notification.name, index = record.index, "{text}"),
        }
    }
}

impl EventSink for mpsc::UnboundedSender<Notification> {
    fn on_new_event(&self, record: &EventRecord, channel: Channel) {
        if self.send(Notification::new(record, channel)).is_err() {
            warn!(channel = %channel, "notification receiver dropped");
        }
    }
}
