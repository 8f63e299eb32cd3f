//! JSON API handlers.
//!
//! Every handler answers with a normal JSON body; transfer problems are
//! reported as `{"success": false, "message": ...}` rather than HTTP errors.

use std::num::NonZeroU16;
use std::path::PathBuf;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::WebState;
use crate::core::{Listing, TransferOutcome};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub path: Option<String>,
}

pub async fn list_directory(
    State(state): State<WebState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Listing>, (StatusCode, String)> {
    let sandbox = state.sandbox.clone();

    // Directory reads block
    tokio::task::spawn_blocking(move || {
        let requested = params.path.map(PathBuf::from).unwrap_or_default();
        let resolved = sandbox.resolve(&requested, sandbox.root());
        sandbox.list(&resolved)
    })
    .await
    .map(Json)
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub log: Vec<String>,
}

pub async fn history(State(state): State<WebState>) -> Json<LogResponse> {
    let log = state.orchestrator.recent_history(state.history_limit).await;
    Json(LogResponse { log })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DestinationResponse {
    pub destination: Option<String>,
}

pub async fn last_destination(State(state): State<WebState>) -> Json<DestinationResponse> {
    let destination = state.orchestrator.suggested_destination().await;
    Json(DestinationResponse { destination })
}

/// HTML number inputs post their value as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortField {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct CopyBody {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub dest: String,
    #[serde(default)]
    pub port: Option<PortField>,
}

pub async fn copy(
    State(state): State<WebState>,
    body: Result<Json<CopyBody>, JsonRejection>,
) -> Json<TransferOutcome> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return Json(TransferOutcome::failure(rejection.body_text())),
    };

    let source = body.source.trim();
    let dest = body.dest.trim();
    if source.is_empty() || dest.is_empty() {
        return Json(TransferOutcome::failure(
            "Source and destination are required",
        ));
    }

    let port = match parse_port(body.port.as_ref(), state.default_port) {
        Ok(port) => port,
        Err(raw) => return Json(TransferOutcome::failure(format!("Invalid port: {}", raw))),
    };

    Json(state.orchestrator.copy_file(source, dest, port).await)
}

/// Absent or blank ports fall back to `default`; the raw text is returned on error.
fn parse_port(field: Option<&PortField>, default: NonZeroU16) -> Result<NonZeroU16, String> {
    match field {
        None => Ok(default),
        Some(PortField::Number(n)) => u16::try_from(*n)
            .ok()
            .and_then(NonZeroU16::new)
            .ok_or_else(|| n.to_string()),
        Some(PortField::Text(s)) if s.trim().is_empty() => Ok(default),
        Some(PortField::Text(s)) => s.trim().parse().map_err(|_| s.clone()),
    }
}
