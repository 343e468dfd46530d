//! Mock Gemini backend for integration tests
//!
//! Serves `streamGenerateContent` as SSE from a scripted list of payloads
//! and records every request it receives.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// One SSE event per entry, sent verbatim as `data:` payloads
    Events(Vec<String>),
    /// Like `Events`, with a pause before every event after the first
    Paced(Vec<String>, Duration),
    /// A non-success status with a JSON body
    Status(StatusCode, serde_json::Value),
}

impl Reply {
    /// SSE reply from JSON chunks
    pub fn chunks(chunks: impl IntoIterator<Item = serde_json::Value>) -> Self {
        Self::Events(chunks.into_iter().map(|c| c.to_string()).collect())
    }
}

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path segment after `models/`, e.g. `gemini-2.5-flash:streamGenerateContent`
    pub call: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

/// Mock Gemini server
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockGemini {
    /// Start the mock server with a fixed reply
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1beta/models/{call}", routing::post(handle_models_call))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("mock state poisoned").clone()
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_models_call(
    State(state): State<Arc<MockState>>,
    Path(call): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    state.requests.lock().expect("mock state poisoned").push(RecordedRequest {
        call: call.clone(),
        query,
        api_key,
        body,
    });

    if !call.ends_with(":streamGenerateContent") {
        return (StatusCode::NOT_FOUND, format!("unknown method in {call}")).into_response();
    }

    match &state.reply {
        Reply::Status(status, body) => (*status, Json(body.clone())).into_response(),
        Reply::Events(events) => {
            let body: String = events.iter().map(|data| format!("data: {data}\r\n\r\n")).collect();
            (
                StatusCode::OK,
                [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
                body,
            )
                .into_response()
        }
        Reply::Paced(events, pause) => {
            let pause = *pause;
            let events = futures_util::stream::iter(events.clone().into_iter().enumerate()).then(
                move |(i, data)| async move {
                    if i > 0 {
                        tokio::time::sleep(pause).await;
                    }
                    Ok::<_, std::convert::Infallible>(format!("data: {data}\r\n\r\n"))
                },
            );
            (
                StatusCode::OK,
                [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
                Body::from_stream(events),
            )
                .into_response()
        }
    }
}
