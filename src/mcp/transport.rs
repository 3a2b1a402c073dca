//! HTTP transport
//!
//! A single route serves both roles: `GET` opens a server-sent event stream
//! that announces the server once, `POST` carries JSON-RPC requests. Every
//! other verb gets `405 Method Not Allowed`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method as HttpMethod, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::{self, BoxStream, StreamExt};
use tower_http::trace::TraceLayer;

use crate::config::endpoint;
use crate::error::{ProtocolError, Result};
use crate::mcp::server::McpServer;
use crate::mcp::types::JsonRpcResponse;

/// Build the router for the combined `/mcp` endpoint
pub fn router(server: Arc<McpServer>) -> Router {
    // `get` would also answer HEAD, which this endpoint does not serve.
    let mcp = get(handle_sse)
        .head(method_not_allowed)
        .post(handle_rpc)
        .fallback(method_not_allowed);

    Router::new()
        .route(endpoint::PATH, mcp)
        .layer(DefaultBodyLimit::max(endpoint::MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Bind `addr` and serve until the process exits
pub async fn serve(addr: SocketAddr, server: Arc<McpServer>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "MCP server running on http://{}{}",
        listener.local_addr()?,
        endpoint::PATH
    );

    axum::serve(listener, router(server)).await?;
    Ok(())
}

/// Logs the disconnect when the event stream is dropped by hyper
struct DisconnectGuard;

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        tracing::info!("SSE client disconnected");
    }
}

async fn handle_sse(State(server): State<Arc<McpServer>>) -> Response {
    tracing::info!("SSE client connected");

    let announcement = match serde_json::to_string(&server.announcement()) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode SSE announcement");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let frames = [
        Bytes::from(format!("retry: {}\n\n", endpoint::SSE_RETRY_MS)),
        Bytes::from(format!("data: {}\n\n", announcement)),
    ];

    let guard = DisconnectGuard;
    let events: BoxStream<'static, std::result::Result<Bytes, Infallible>> =
        stream::iter(frames.map(Ok::<Bytes, Infallible>))
            .chain(stream::pending())
            .map(move |frame| {
                let _ = &guard;
                frame
            })
            .boxed();

    let mut response = Body::from_stream(events).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

async fn handle_rpc(State(server): State<Arc<McpServer>>, body: Bytes) -> Response {
    let message: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Unparseable request body");
            let reply = JsonRpcResponse::error(
                None,
                ProtocolError::Parse {
                    message: e.to_string(),
                }
                .to_jsonrpc(),
            );
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    tracing::debug!(message = %message, "RPC received");
    let reply = server.handle_value(message).await;
    tracing::debug!(
        reply = %serde_json::to_string(&reply).unwrap_or_default(),
        "RPC reply"
    );

    (StatusCode::OK, Json(reply)).into_response()
}

async fn method_not_allowed(method: HttpMethod, uri: Uri) -> Response {
    tracing::debug!(%method, %uri, "Method not allowed");
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}
