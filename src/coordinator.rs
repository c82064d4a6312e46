//! Poll loop: fetch a snapshot, derive the latest event and error, announce
//! what is new, keep a [`Summary`] for presentation.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dw_core::{Channel, Normalizer, RawSnapshot, Summary};
use dw_feeds::{FetchError, SnapshotSource};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::sink::EventSink;

pub struct Coordinator<S, K> {
    source: S,
    sink: K,
    normalizer: Normalizer,
    summary: Summary,
    last_snapshot: Option<RawSnapshot>,
}

impl<S: SnapshotSource, K: EventSink> Coordinator<S, K> {
    pub fn new(source: S, normalizer: Normalizer, sink: K) -> Self {
        Self {
            source,
            sink,
            normalizer,
            summary: Summary::unavailable(),
            last_snapshot: None,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// One fetch-derive-announce cycle.
    ///
    /// A failed fetch keeps the previous summary (marked unreachable) and
    /// leaves the notification state alone, so the next good poll does not
    /// re-announce what was already announced.
    pub async fn poll_once(&mut self) -> Result<&Summary, FetchError> {
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => Ok(self.apply(snapshot, Utc::now())),
            Err(err) => {
                warn!(source = %self.source.describe(), error = %err, "poll failed");
                self.summary.reachable = false;
                Err(err)
            }
        }
    }

    /// Derive from an already-fetched snapshot taken at `at`.
    pub fn apply(&mut self, snapshot: RawSnapshot, at: DateTime<Utc>) -> &Summary {
        let last_event = self.normalizer.derive_latest_event(&snapshot);
        let last_error = self.normalizer.derive_latest_error(&snapshot);

        for (record, channel) in [
            (last_event.as_ref(), Channel::Event),
            (last_error.as_ref(), Channel::Error),
        ] {
            if self.normalizer.should_notify(record, channel) {
                if let Some(record) = record {
                    self.sink.on_new_event(record, channel);
                }
            }
        }

        self.summary = Summary::from_records(last_event, last_error, at);
        debug!(
            keys = snapshot.len(),
            status = ?self.summary.status,
            trouble = self.summary.trouble,
            "poll applied"
        );
        self.last_snapshot = Some(snapshot);
        &self.summary
    }

    /// Poll every `every` until `shutdown` resolves. The first poll happens
    /// immediately; failures are logged and the loop carries on.
    pub async fn run<F>(&mut self, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(source = %self.source.describe(), interval = ?every, "polling started");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("polling stopped");
                    return;
                }
                _ = ticker.tick() => {
                    // Already logged in poll_once.
                    let _ = self.poll_once().await;
                }
            }
        }
    }

    /// Raw data plus derived state, for bug reports.
    pub fn diagnostics(&self) -> serde_json::Value {
        serde_json::json!({
            "source": self.source.describe(),
            "raw": self.last_snapshot,
            "summary": self.summary,
        })
    }
}
