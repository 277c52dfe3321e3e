//! /updates handlers — package download and reservation release.
//!
//! Per-request flow for a download: ban check (before any slot is
//! taken) → admission → platform resolution → stream. The slot guard
//! releases the reservation on every early exit after admission; a
//! successful hand-off keeps it reserved until the client clears it or
//! the TTL reclaims it.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use outpost_services::packages::DOWNLOAD_FILE_NAME;

use super::ApiState;

// ── /updates/clear/{download_id} ──────────────────────────────────────────────

pub async fn handle_clear_download(
    State(state): State<ApiState>,
    Path(download_id): Path<String>,
) -> StatusCode {
    tracing::debug!(download_id, "clearing download reservation");
    state.reservations.release(&download_id);
    StatusCode::OK
}

// ── /updates/download/{platform}/{download_id} ────────────────────────────────

pub async fn handle_download_package(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((platform, download_id)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    let remote_ip = peer.ip().to_string();

    if state.bans.check(Some(&remote_ip)).is_denied() {
        return Err((StatusCode::BAD_REQUEST, "request rejected".to_string()));
    }

    let slot = state
        .gate
        .acquire(&download_id, state.reservation_ttl)
        .await
        .map_err(|e| {
            tracing::warn!(download_id, error = %e, "gave up waiting for a download slot");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        })?;

    tracing::debug!(
        waited_ms = slot.waited().as_millis() as u64,
        download_id,
        remote_ip,
        current = state.gate.store().count(),
        max = state.gate.max_concurrent(),
        "download started"
    );

    let file = match state.packages.open(&platform).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            // Slot guard drops here and releases the reservation.
            tracing::warn!(platform, remote_ip, "unknown platform requested");
            return Err((
                StatusCode::BAD_REQUEST,
                format!("unknown platform: {platform}"),
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, platform, "error while serving update package");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "update package unavailable".to_string(),
            ));
        }
    };

    // The reservation outlives the response: the client clears it via
    // /updates/clear, or the TTL reclaims it.
    slot.keep();

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
        ),
    ];
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((headers, body).into_response())
}
