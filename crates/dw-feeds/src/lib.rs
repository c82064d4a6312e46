//! dw-feeds — modem snapshot sources for docsis-watch.
//!
//! Each source connects to the modem, reads the DOCSIS event table in
//! whatever shape the firmware exposes it, and returns a flat
//! [`dw_core::RawSnapshot`] for the normalizer.

use std::future::Future;
use std::time::Duration;

use dw_core::config::{Config, Transport};
use thiserror::Error;

pub mod http;
pub mod snmp;

pub use http::HttpSource;
pub use snmp::SnmpSource;

/// Why a poll produced no snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid modem address {0:?}")]
    InvalidAddress(String),
    #[error("invalid OID {0:?}")]
    InvalidOid(String),
    #[error("request failed: {0}")]
    Http(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SNMP request failed: {0}")]
    Snmp(String),
}

/// Something that can produce one [`dw_core::RawSnapshot`] per call.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshot(
        &self,
    ) -> impl Future<Output = Result<dw_core::RawSnapshot, FetchError>> + Send;

    /// Short human-readable description, e.g. `http://192.168.100.1/getRouterStatus`.
    fn describe(&self) -> String;
}

/// The configured transport.
#[derive(Debug, Clone)]
pub enum Source {
    Http(HttpSource),
    Snmp(SnmpSource),
}

impl Source {
    pub fn from_config(cfg: &Config) -> Result<Self, FetchError> {
        match cfg.modem.transport {
            Transport::Http => Ok(Source::Http(HttpSource::from_config(cfg)?)),
            Transport::Snmp => Ok(Source::Snmp(SnmpSource::from_config(cfg)?)),
        }
    }
}

impl SnapshotSource for Source {
    async fn fetch_snapshot(&self) -> Result<dw_core::RawSnapshot, FetchError> {
        match self {
            Source::Http(source) => source.fetch_snapshot().await,
            Source::Snmp(source) => source.fetch_snapshot().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Http(source) => source.describe(),
            Source::Snmp(source) => source.describe(),
        }
    }
}
