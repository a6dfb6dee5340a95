// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The forwarding HTTP server and its shutdown handler (§4.11).

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use sm_storage::{Ledger, ProxyRecord};
use tracing::{info, warn};

use crate::error::ProxyError;
use crate::routing::resolve;

struct ProxyState {
    routes: BTreeMap<String, String>,
    client: reqwest::Client,
}

/// Serve the routing table on `listen_port` until the process receives a
/// termination signal, at which point the ProxyRecord is cleared.
pub async fn serve<L: Ledger + 'static>(
    routes: BTreeMap<String, String>,
    listen_port: u16,
    workspace: &std::path::Path,
    ledger: Arc<L>,
    pid: u32,
    started_at: i64,
) -> Result<(), ProxyError> {
    let record = ProxyRecord {
        started_at,
        pid,
        routes: routes.clone(),
    };
    ledger.save_proxy(workspace, &record)?;

    let state = Arc::new(ProxyState {
        routes,
        client: reqwest::Client::new(),
    });
    let app = Router::new().fallback(forward).with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    info!(%addr, "reverse proxy listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let workspace_owned = workspace.to_path_buf();
    let ledger_for_shutdown = Arc::clone(&ledger);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down, clearing proxy record");
            if let Err(err) = ledger_for_shutdown.clear_proxy(&workspace_owned) {
                warn!(error = %err, "failed to clear proxy record on shutdown");
            }
        })
        .await?;

    Ok(())
}

async fn forward(State(state): State<Arc<ProxyState>>, request: Request) -> Response {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/")
        .to_string();
    let host = resolve(&state.routes, request.uri().path());
    let method = request.method().clone();
    let origin_host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let url = format!("http://{host}{path_and_query}");
    let body = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(b) => b,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let upstream = state
        .client
        .request(method, &url)
        .header("X-Forwarded-Host", &origin_host)
        .header("X-Origin-Host", &origin_host)
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(resp) => {
            let status = resp.status();
            let bytes = resp.bytes().await.unwrap_or_default();
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response
        }
        Err(err) => {
            warn!(error = %err, url, "upstream forward failed");
            (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
        }
    }
}
