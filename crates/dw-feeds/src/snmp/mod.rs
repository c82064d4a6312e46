//! SNMPv2c source.
//!
//! Reads the DOCSIS event table one OID at a time with plain GETs, which is
//! the lowest common denominator across cable modem agents. Each GET gets
//! `timeout` per attempt and `retries` extra attempts; an OID that still
//! fails is skipped. The poll only fails as a whole when no OID answered.

pub mod render;

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use async_snmp::{Auth, Client, Oid, Value};
use dw_core::config::{Config, SnmpConfig};
use dw_core::{ColumnLayout, RawSnapshot};
use tracing::debug;

use crate::{FetchError, SnapshotSource};

#[derive(Debug, Clone)]
pub struct SnmpSource {
    host: String,
    port: u16,
    community: String,
    timeout: Duration,
    retries: u32,
    /// Snapshot key and the OID it is read from.
    oids: Vec<(String, Oid)>,
}

impl SnmpSource {
    /// Polls the first `cfg.rows` rows of the time and message columns, and
    /// of the priority column when `cfg.fetch_priority` is set.
    pub fn new(host: &str, cfg: &SnmpConfig, layout: &ColumnLayout) -> Result<Self, FetchError> {
        let host = host
            .trim()
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/');
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(FetchError::InvalidAddress(host.to_string()));
        }
        let oids = layout
            .keys(cfg.rows, cfg.fetch_priority)
            .into_iter()
            .map(|key| parse_oid(&key).map(|oid| (key, oid)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            host: host.to_string(),
            port: cfg.port,
            community: cfg.community.clone(),
            timeout: cfg.timeout(),
            retries: cfg.retries,
            oids,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, FetchError> {
        Self::new(&cfg.modem.host, &cfg.snmp, &cfg.columns)
    }

    /// Snapshot keys in request order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.oids.iter().map(|(key, _)| key.as_str())
    }

    async fn resolve(&self) -> Result<SocketAddr, FetchError> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| FetchError::InvalidAddress(self.host.clone()))
    }

    /// Run every configured GET through `get`, keeping what answered.
    async fn poll<F, Fut>(&self, get: F) -> Result<RawSnapshot, FetchError>
    where
        F: Fn(Oid) -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        let mut snapshot = RawSnapshot::new();
        let mut answered = false;
        let mut last_error = None;

        for (key, oid) in &self.oids {
            match self.get_with_retries(&get, oid).await {
                Ok(value) => {
                    answered = true;
                    if let Some(text) = render::render(&value) {
                        snapshot.insert(key.clone(), text);
                    } else {
                        debug!(oid = %key, "no such instance");
                    }
                }
                Err(err) => {
                    debug!(oid = %key, error = %err, "SNMP get failed");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if !answered => Err(err),
            _ => Ok(snapshot),
        }
    }

    async fn get_with_retries<F, Fut>(&self, get: &F, oid: &Oid) -> Result<Value, FetchError>
    where
        F: Fn(Oid) -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            let result = tokio::time::timeout(self.timeout, get(oid.clone()))
                .await
                .unwrap_or_else(|_| Err(FetchError::Timeout(self.timeout)));
            match result {
                Err(FetchError::Timeout(_)) if attempt < self.retries => attempt += 1,
                other => return other,
            }
        }
    }
}

impl SnapshotSource for SnmpSource {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError> {
        let target = self.resolve().await?;
        // The per-attempt deadline in `get_with_retries` decides; the
        // client's own timer only backs it up.
        let client = Client::builder(&target.to_string(), Auth::v2c(self.community.as_str()))
            .timeout(self.timeout * 2)
            .connect()
            .await
            .map_err(|err| FetchError::Snmp(err.to_string()))?;

        let client = &client;
        let snapshot = self
            .poll(move |oid: Oid| async move {
                client
                    .get(&oid)
                    .await
                    .map(|varbind| varbind.value)
                    .map_err(|err| FetchError::Snmp(err.to_string()))
            })
            .await?;
        debug!(target = %target, keys = snapshot.len(), "SNMP poll complete");
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("snmp://{}:{}", self.host, self.port)
    }
}

/// Dotted OID text → [`Oid`]. The first two arcs must be encodable as one
/// sub-identifier.
fn parse_oid(text: &str) -> Result<Oid, FetchError> {
    let invalid = || FetchError::InvalidOid(text.to_string());
    let arcs = text
        .split('.')
        .map(str::parse::<u32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    match arcs.as_slice() {
        [0 | 1, second, ..] if *second < 40 => {}
        [2, second, ..] if *second <= u32::MAX - 80 => {}
        _ => return Err(invalid()),
    }
    Ok(Oid::from_slice(&arcs))
}
