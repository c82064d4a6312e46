//! dw-core — docsis-watch core library.
//!
//! This crate holds everything that does not touch the network: the data
//! model, payload decoding, the event normalizer and configuration.
//!
//! # Pipeline
//!
//! ```text
//! payload ──► extract ──► RawSnapshot ──► Normalizer ──► EventRecord(s)
//!                                             │
//!                                             └──► NotificationState
//! ```
//!
//! Feeds (HTTP, SNMP) live in `dw-feeds`; they produce a [`RawSnapshot`] per
//! poll and hand it to a [`Normalizer`].

pub mod config;
pub mod extract;
pub mod layout;
pub mod normalizer;
pub mod rules;
pub mod timestamp;
pub mod types;

pub use layout::ColumnLayout;
pub use normalizer::{EventTable, NotificationState, Normalizer};
pub use rules::Rules;
pub use timestamp::normalize_timestamp;
pub use types::{Channel, EventRecord, Priority, RawSnapshot, Status, Summary};
