//! Fake modem web UI for HTTP source tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /getRouterStatus` with whatever body and status the test configured
//! - `GET /pages/{name}` for alternate status paths
//!
//! Every request's query string and headers are recorded so tests can check
//! the cache-buster parameters and XHR headers.
//!
//! # Example
//!
//! ```rust,no_run
//! let modem = FakeModemApi::start().await.unwrap();
//! modem.respond(200, FLAT_STATUS_JSON).await;
//! let source = HttpSource::new(&modem.base_url(), "/getRouterStatus", timeout, layout)?;
//! ```

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request as the fake saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

struct ApiState {
    status: StatusCode,
    body: String,
    delay: Duration,
    seen: Vec<SeenRequest>,
}

/// Handle to the running fake modem.
pub struct FakeModemApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeModemApi {
    /// Start the fake on a random port. Returns once the server is listening.
    /// Until configured it answers `200` with an empty JSON object.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            status: StatusCode::OK,
            body: "{}".to_string(),
            delay: Duration::ZERO,
            seen: Vec::new(),
        }));

        let app = Router::new()
            .route("/getRouterStatus", get(router_status))
            .route("/pages/{name}", get(page))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Bare `127.0.0.1:PORT`, the way a user would type the modem host.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    /// Base URL (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn respond(&self, status: u16, body: &str) {
        let mut state = self.state.lock().await;
        state.status = StatusCode::from_u16(status).unwrap();
        state.body = body.to_string();
    }

    /// Hold every response for `delay` before answering.
    pub async fn stall(&self, delay: Duration) {
        self.state.lock().await.delay = delay;
    }

    pub async fn requests(&self) -> Vec<SeenRequest> {
        self.state.lock().await.seen.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn answer(
    state: &Mutex<ApiState>,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let (status, body, delay) = {
        let mut state = state.lock().await;
        state.seen.push(SeenRequest {
            path,
            query,
            headers,
        });
        (state.status, state.body.clone(), state.delay)
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (status, body)
}

async fn router_status(
    State(state): State<Arc<Mutex<ApiState>>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    answer(&state, "/getRouterStatus".to_string(), query, headers).await
}

async fn page(
    Path(name): Path<String>,
    State(state): State<Arc<Mutex<ApiState>>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    answer(&state, format!("/pages/{name}"), query, headers).await
}
