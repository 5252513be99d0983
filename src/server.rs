use crate::{
    config::{Config, Transport},
    errors::{into_response, AppError},
    mcp::{dispatch::Dispatcher, registry::ToolRegistry, types::ServerInfo},
    security,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

pub async fn serve(cfg: Config, registry: ToolRegistry) -> anyhow::Result<()> {
    let info = ServerInfo { name: cfg.server.name.clone(), version: cfg.server.version.clone() };
    let dispatcher = Arc::new(Dispatcher::new(registry, info));

    match cfg.server.transport {
        Transport::Stdio => {
            tracing::info!("Notion MCP server running on stdio");
            serve_io(dispatcher, tokio::io::stdin(), tokio::io::stdout()).await
        }
        Transport::Http => {
            let addr = cfg.http_addr();
            let app = build_router(AppState { cfg: Arc::new(cfg), dispatcher });
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(addr = %addr, "Notion MCP server listening");
            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}

/// Newline-delimited JSON-RPC until `reader` hits EOF. Requests run
/// concurrently; a single writer task keeps response lines whole.
pub async fn serve_io<R, W>(dispatcher: Arc<Dispatcher>, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(32);
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        // a bad line gets a parse error; the stream stays open
        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                if let Some(reply) = dispatcher.parse_error(&e) {
                    let _ = tx.send(reply).await;
                }
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let dispatcher = dispatcher.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = dispatcher.handle_line(&line).await {
                let _ = tx.send(response).await;
            }
        });
    }
    drop(tx);

    writer_task.await??;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    let base = shared.cfg.http.base_path.trim_end_matches('/').to_string();
    let rpc_path = if base.is_empty() { "/".to_string() } else { base.clone() };
    let limit_bytes = shared.cfg.http.max_request_kb * 1024;
    Router::new()
        .route("/healthz", get(health))
        .route(&format!("{base}/tools"), get(list_tools))
        .route(&rpc_path, post(rpc).layer(RequestBodyLimitLayer::new(limit_bytes)))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match authorize(&state, &headers) {
        Ok(()) => (StatusCode::OK, Json(json!({"status":"ok"}))).into_response(),
        Err(e) => into_response(e).into_response(),
    }
}

async fn list_tools(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return into_response(e).into_response();
    }
    (StatusCode::OK, Json(state.dispatcher.list_tools())).into_response()
}

async fn rpc(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let origin = headers.get("Origin").and_then(|v| v.to_str().ok()).unwrap_or("").to_string();

    let checked = authorize(&state, &headers)
        .and_then(|()| security::content_length_ok(&headers, state.cfg.http.max_request_kb));
    if let Err(e) = checked {
        audit_http(&request_id, &origin, "deny", e.kind(), started.elapsed().as_millis() as u64, 0);
        return into_response(e).into_response();
    }

    match state.dispatcher.handle_line(&body).await {
        Some(payload) => {
            audit_http(&request_id, &origin, "allow", "OK", started.elapsed().as_millis() as u64, payload.len() as u64);
            (StatusCode::OK, [(axum::http::header::CONTENT_TYPE, "application/json")], payload).into_response()
        }
        None => {
            audit_http(&request_id, &origin, "allow", "Accepted", started.elapsed().as_millis() as u64, 0);
            StatusCode::ACCEPTED.into_response()
        }
    }
}

fn audit_http(request_id: &str, origin: &str, decision: &str, code: &str, duration_ms: u64, bytes_out: u64) {
    tracing::info!(
        request_id = request_id,
        origin = origin,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        bytes_out = bytes_out,
        "http"
    );
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    security::require_bearer(headers, &state.cfg.http.bearer_token)?;
    security::check_origin(headers, &state.cfg.http.allowed_origins)?;
    Ok(())
}
