use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};

use crate::{auth::extractors::SessionUser, state::AppState};

use super::dto::{ReportResponse, ScanBase64, ScanResponse, DISCLAIMER};
use super::services::{ScanError, ScanUpload, UploadItem};

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scans", post(scan_multipart)) // multipart file / files
        .route("/scans/base64", post(scan_base64))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports/:id", get(get_report))
}

fn rejected(e: ScanError) -> (StatusCode, String) {
    warn!(error = %e, "rejected scan upload");
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "scan failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

async fn run_scan(
    state: &AppState,
    upload: ScanUpload,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let report = state.analyzer.analyze(&upload).await.map_err(internal)?;
    info!(upload = %upload.id, report = %report.id, "scan complete");
    Ok(Json(ScanResponse {
        upload_id: upload.id,
        report_path: format!("/report/{}", report.id),
        report,
    }))
}

/// POST /scans (multipart, field `file` or `files`)
#[instrument(skip(state, mp))]
pub async fn scan_multipart(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let mut items = Vec::new();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?
    {
        if !matches!(field.name(), Some("file" | "files" | "files[]")) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
        items.push(UploadItem { body, content_type });
    }

    let upload = ScanUpload::from_items(items).map_err(rejected)?;
    run_scan(&state, upload).await
}

/// POST /scans/base64 { image_b64: "...", content_type?: "image/jpeg" }
#[instrument(skip(state, body))]
pub async fn scan_base64(
    State(state): State<AppState>,
    Json(body): Json<ScanBase64>,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let bytes = STANDARD
        .decode(body.image_b64.trim())
        .map_err(|_| rejected(ScanError::InvalidBase64))?;
    let item = UploadItem {
        body: Bytes::from(bytes),
        content_type: body.content_type.unwrap_or_else(|| "image/jpeg".into()),
    };

    let upload = ScanUpload::from_items(vec![item]).map_err(rejected)?;
    run_scan(&state, upload).await
}

#[instrument(skip(state, session))]
pub async fn get_report(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, (StatusCode, String)> {
    let report = state.analyzer.report(&id).await.map_err(|e| {
        error!(error = %e, profile = %session.profile, %id, "report lookup failed");
        (StatusCode::NOT_FOUND, "Report not found".to_string())
    })?;
    Ok(Json(ReportResponse {
        report,
        disclaimer: DISCLAIMER,
    }))
}
