//! Scripted [`SnapshotSource`] for coordinator tests.
//!
//! Each call to `fetch_snapshot` pops the next scripted outcome. When the
//! script runs dry the last outcome repeats, so a loop test can run for as
//! many ticks as it likes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dw_core::RawSnapshot;
use dw_feeds::{FetchError, SnapshotSource};

#[derive(Clone)]
pub enum Outcome {
    Snapshot(RawSnapshot),
    Timeout,
    Refused,
}

impl Outcome {
    fn to_result(&self) -> Result<RawSnapshot, FetchError> {
        match self {
            Outcome::Snapshot(s) => Ok(s.clone()),
            Outcome::Timeout => Err(FetchError::Timeout(Duration::from_secs(10))),
            Outcome::Refused => Err(FetchError::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            ))),
        }
    }
}

#[derive(Clone)]
pub struct FakeSource {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    last: Arc<Mutex<Option<Outcome>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(script: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            last: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<RawSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().unwrap();
        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            *last = Some(outcome);
        }
        last.as_ref().map_or(Ok(RawSnapshot::new()), Outcome::to_result)
    }
}

impl SnapshotSource for FakeSource {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError> {
        self.next()
    }

    fn describe(&self) -> String {
        "fake://modem".to_string()
    }
}
