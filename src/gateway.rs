//! HTTP gateway exposing tool definitions and the dispatcher, plus
//! liveness/readiness endpoints.

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::providers::ToolCallRequest;
use crate::tools::{ToolRegistry, ToolResult};

#[derive(Clone)]
struct GatewayState {
    ready: Arc<AtomicBool>,
    registry: Arc<ToolRegistry>,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    calls: Vec<ToolCallRequest>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    results: Vec<ToolResult>,
}

async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn ready_handler(State(state): State<GatewayState>) -> (StatusCode, &'static str) {
    if state.ready.load(Ordering::SeqCst) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    }
}

async fn list_tools_handler(State(state): State<GatewayState>) -> Response {
    match state.registry.get_tool_definitions().await {
        Ok(defs) => Json(defs).into_response(),
        Err(err) => {
            tracing::error!("failed to list tool definitions: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(ToolResult::error(err.to_string())),
            )
                .into_response()
        }
    }
}

async fn call_tool_handler(
    State(state): State<GatewayState>,
    Json(req): Json<ToolCallRequest>,
) -> Json<ToolResult> {
    Json(state.registry.execute(&req.name, &req.arguments).await)
}

async fn batch_handler(
    State(state): State<GatewayState>,
    Json(req): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let results = state.registry.execute_all(&req.calls).await;
    Json(BatchResponse { results })
}

fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/call", post(call_tool_handler))
        .route("/tools/batch", post(batch_handler))
        .with_state(state)
}

pub struct GatewayServer {
    host: String,
    port: u16,
    ready: Arc<AtomicBool>,
    registry: Arc<ToolRegistry>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl GatewayServer {
    pub fn new(host: &str, port: u16, registry: Arc<ToolRegistry>) -> Self {
        Self {
            host: host.to_string(),
            port,
            ready: Arc::new(AtomicBool::new(false)),
            registry,
            shutdown_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Bind and serve in the background. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;

        let app = router(GatewayState {
            ready: self.ready.clone(),
            registry: self.registry.clone(),
        });
        let (tx, rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = rx.await;
        });

        let ready_flag = self.ready.clone();
        let handle = tokio::spawn(async move {
            ready_flag.store(true, Ordering::SeqCst);
            if let Err(err) = server.await {
                tracing::error!("gateway server failed: {}", err);
            }
        });

        *self.shutdown_tx.lock() = Some(tx);
        *self.handle.lock() = Some(handle);
        tracing::info!(%local, "gateway listening");
        Ok(local)
    }

    pub async fn stop(&self) -> Result<()> {
        self.ready.store(false, Ordering::SeqCst);

        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }

        let handle = { self.handle.lock().take() };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        tracing::info!("gateway stopped");
        Ok(())
    }
}
