//! HTTP status-page source.
//!
//! Issues the same XHR the modem's web UI does (`GET /getRouterStatus` with
//! `_n`/`_` cache-buster parameters) and decodes whatever comes back, JSON
//! or HTML, through [`dw_core::extract::decode_payload`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use dw_core::config::Config;
use dw_core::extract::decode_payload;
use dw_core::{ColumnLayout, RawSnapshot};
use http_body_util::{BodyExt, Empty};
use hyper::header::{ACCEPT, REFERER};
use hyper::{Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use crate::{FetchError, SnapshotSource};

const ACCEPT_VALUE: &str = "application/json, text/javascript, */*; q=0.01";
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client<HttpConnector, Empty<Bytes>>,
    base: String,
    path: String,
    timeout: Duration,
    layout: ColumnLayout,
}

impl HttpSource {
    /// `host` may be a bare address (`192.168.100.1`) or a URL
    /// (`http://192.168.100.1/`).
    pub fn new(
        host: &str,
        path: &str,
        timeout: Duration,
        layout: ColumnLayout,
    ) -> Result<Self, FetchError> {
        let base = base_url(host);
        if host.trim().is_empty() || base.parse::<Uri>().is_err() {
            return Err(FetchError::InvalidAddress(host.to_string()));
        }
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base,
            path,
            timeout,
            layout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, FetchError> {
        Self::new(
            &cfg.modem.host,
            &cfg.http.path,
            cfg.http.timeout(),
            cfg.columns.clone(),
        )
    }

    fn request_uri(&self) -> Result<Uri, FetchError> {
        let (n, millis) = cache_buster();
        let uri = format!("{}{}?_n={n}&_={millis}", self.base, self.path);
        uri.parse()
            .map_err(|_| FetchError::InvalidAddress(self.base.clone()))
    }

    async fn get(&self) -> Result<(StatusCode, Bytes), FetchError> {
        let request = Request::get(self.request_uri()?)
            .header(ACCEPT, ACCEPT_VALUE)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, format!("{}/", self.base))
            .body(Empty::<Bytes>::new())?;
        let response = self.client.request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        Ok((status, body))
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError> {
        let (status, body) = tokio::time::timeout(self.timeout, self.get())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        let text = String::from_utf8_lossy(&body);
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let snapshot = decode_payload(&text, &self.layout);
        debug!(bytes = body.len(), keys = snapshot.len(), "decoded status page");
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("{}{}", self.base, self.path)
    }
}

/// Trim, drop trailing slashes and default to `http://`.
pub fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// `_n` is five digits, `_` is epoch milliseconds.
fn cache_buster() -> (u32, u128) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (10_000 + now.subsec_nanos() % 90_000, now.as_millis())
}
