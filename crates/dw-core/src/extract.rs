//! Payload decoding: turns a raw status-page body into a [`RawSnapshot`].
//!
//! Decoding is attempted in order: flat column map → JSON event list → HTML
//! table rows. The first shape that yields anything wins. Every heuristic is
//! best-effort: an unexpected payload degrades to an empty snapshot, never an
//! error.
//!
//! Only the last [`MAX_ROWS`] extracted rows are kept, in their original
//! order, and then re-indexed `1..=N`.

use std::sync::LazyLock;

use phf::{phf_map, phf_set};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::layout::ColumnLayout;
use crate::types::RawSnapshot;

/// Upper bound on rows carried into a snapshot.
pub const MAX_ROWS: usize = 20;

/// Keys under which firmwares publish their event list.
pub const EVENT_LIST_KEYS: &[&str] = &["events", "EventLog", "docsis_events", "docsisLog", "log"];

/// Wrapper objects searched one level deep when no list is found at the top.
pub const WRAPPER_KEYS: &[&str] = &["data", "status", "result"];

/// A row recovered from JSON or HTML, before indexing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRow {
    pub time: String,
    pub message: String,
    pub priority: Option<String>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Decode a status-page body into a snapshot addressed by `layout`.
///
/// A JSON object that already carries event-table keys is taken as-is
/// (scalar values stringified). Anything else goes through
/// [`extract_rows`] and is laid out as rows `1..=N`.
pub fn decode_payload(payload: &str, layout: &ColumnLayout) -> RawSnapshot {
    let json = serde_json::from_str::<Value>(payload).ok();

    if let Some(snapshot) = json.as_ref().and_then(|v| flat_snapshot(v, layout)) {
        debug!(keys = snapshot.len(), "decoded flat column map");
        return snapshot;
    }

    let rows = rows_from(json.as_ref(), payload);
    RawSnapshot::from_rows(&rows, layout)
}

/// Recover event rows from an unstructured payload (JSON first, then HTML).
pub fn extract_rows(payload: &str) -> Vec<ExtractedRow> {
    let json = serde_json::from_str::<Value>(payload).ok();
    rows_from(json.as_ref(), payload)
}

fn rows_from(json: Option<&Value>, payload: &str) -> Vec<ExtractedRow> {
    let rows = match json.and_then(extract_json) {
        Some(rows) => {
            debug!(rows = rows.len(), "extracted rows from JSON");
            rows
        }
        None => {
            let rows = extract_html(payload);
            debug!(rows = rows.len(), "extracted rows from HTML");
            rows
        }
    };
    retain_recent(rows)
}

/// Keep only the last [`MAX_ROWS`] rows, preserving order.
pub fn retain_recent(mut rows: Vec<ExtractedRow>) -> Vec<ExtractedRow> {
    if rows.len() > MAX_ROWS {
        rows.drain(..rows.len() - MAX_ROWS);
    }
    rows
}

fn flat_snapshot(value: &Value, layout: &ColumnLayout) -> Option<RawSnapshot> {
    let object = value.as_object()?;
    if !object.keys().any(|k| layout.is_event_key(k)) {
        return None;
    }
    Some(
        object
            .iter()
            .filter_map(|(k, v)| Some((k.as_str(), raw_scalar(v)?)))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// JSON shapes
// ---------------------------------------------------------------------------

type ShapeMatcher = fn(&Value) -> Option<Vec<ExtractedRow>>;

/// Tried in order; first non-empty result wins.
const JSON_SHAPES: &[(&str, ShapeMatcher)] = &[
    ("event_list", event_list),
    ("known_key", known_key),
    ("wrapped", wrapped),
];

/// Find an event list in a parsed JSON document.
pub fn extract_json(value: &Value) -> Option<Vec<ExtractedRow>> {
    JSON_SHAPES.iter().find_map(|(name, matcher)| {
        let rows = matcher(value)?;
        debug!(shape = *name, rows = rows.len(), "JSON shape matched");
        Some(rows)
    })
}

/// A bare array of event objects.
fn event_list(value: &Value) -> Option<Vec<ExtractedRow>> {
    let rows: Vec<ExtractedRow> = value
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .filter_map(row_from_object)
        .collect();
    (!rows.is_empty()).then_some(rows)
}

/// An event array under one of [`EVENT_LIST_KEYS`].
fn known_key(value: &Value) -> Option<Vec<ExtractedRow>> {
    let object = value.as_object()?;
    EVENT_LIST_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(event_list))
}

/// A known key nested one level under [`WRAPPER_KEYS`].
fn wrapped(value: &Value) -> Option<Vec<ExtractedRow>> {
    let object = value.as_object()?;
    WRAPPER_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(known_key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    Message,
    Priority,
}

/// Lower-cased JSON key → (field, precedence). Lower precedence wins when an
/// object carries several aliases of the same field.
static FIELD_ALIASES: phf::Map<&'static str, (Field, u8)> = phf_map! {
    "time" => (Field::Time, 0),
    "timestamp" => (Field::Time, 1),
    "date" => (Field::Time, 2),
    "datetime" => (Field::Time, 3),
    "message" => (Field::Message, 0),
    "text" => (Field::Message, 1),
    "event" => (Field::Message, 2),
    "priority" => (Field::Priority, 0),
    "pri" => (Field::Priority, 1),
    "severity" => (Field::Priority, 2),
};

fn row_from_object(object: &Map<String, Value>) -> Option<ExtractedRow> {
    let mut best: [Option<(u8, String)>; 3] = Default::default();

    for (key, value) in object {
        let Some(&(field, rank)) = FIELD_ALIASES.get(key.to_lowercase().as_str()) else {
            continue;
        };
        let Some(text) = scalar_text(value) else {
            continue;
        };
        let slot = &mut best[field as usize];
        if slot.as_ref().map_or(true, |(current, _)| rank < *current) {
            *slot = Some((rank, text));
        }
    }

    let [time, message, priority] = best.map(|slot| slot.map(|(_, text)| text));
    let time = time.filter(|t| !t.is_empty())?;
    let message = message.filter(|m| !m.is_empty())?;
    Some(ExtractedRow {
        time,
        message,
        priority: priority.filter(|p| !p.is_empty()),
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    raw_scalar(value).map(|text| text.trim().to_string())
}

fn raw_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// HTML rows
// ---------------------------------------------------------------------------

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());
static TABLE_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]\s*>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static TIME_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:",
        r"(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/\d{2,4})(?:[ t]\d{1,2}:\d{2}(?::\d{2})?)?",
        r"|\d{1,2}:\d{2}:\d{2}",
        r"|(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)",
        r")"
    ))
    .unwrap()
});

/// Cell texts that only ever appear in header rows.
static HEADER_LABELS: phf::Set<&'static str> = phf_set! {
    "message",
    "event",
    "description",
};

/// Scrape `(time, priority, message)` rows out of an HTML status page.
///
/// The first cell must look like a time (otherwise it is swapped with the
/// second cell if that one does, else the row is dropped). The last cell is
/// the message and a middle cell, if any, the priority.
pub fn extract_html(payload: &str) -> Vec<ExtractedRow> {
    let page = WHITESPACE.replace_all(payload, " ");
    if looks_like_login(&page) {
        debug!("status page is a login form; no rows extracted");
        return Vec::new();
    }

    TABLE_ROW
        .captures_iter(&page)
        .filter_map(|row| {
            let cells: Vec<String> = TABLE_CELL
                .captures_iter(&row[1])
                .map(|cell| cell_text(&cell[1]))
                .collect();
            row_from_cells(cells)
        })
        .collect()
}

fn looks_like_login(page: &str) -> bool {
    let lower = page.to_lowercase();
    (lower.contains("login") || lower.contains("sign in")) && lower.contains("password")
}

fn row_from_cells(mut cells: Vec<String>) -> Option<ExtractedRow> {
    if cells.len() < 2 {
        return None;
    }
    if !is_time_like(&cells[0]) {
        if !is_time_like(&cells[1]) {
            return None;
        }
        cells.swap(0, 1);
    }

    let message = cells.pop()?;
    if message.is_empty() || HEADER_LABELS.contains(message.to_lowercase().as_str()) {
        return None;
    }
    let priority = cells.get(1).filter(|p| !p.is_empty()).cloned();
    Some(ExtractedRow {
        time: cells.swap_remove(0),
        message,
        priority,
    })
}

fn is_time_like(cell: &str) -> bool {
    TIME_LIKE.is_match(cell)
}

fn cell_text(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
