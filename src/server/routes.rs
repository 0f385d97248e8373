//! # HTTP Routes
//!
//! The service surface, mirroring the detection API contract:
//!
//! ```text
//! GET  /                 service banner
//! GET  /health           liveness + model readiness + load snapshot
//! POST /analyze          one multipart image -> DetectionResult
//! POST /analyze/batch    up to N multipart images -> ordered results
//! GET  /model/info       scoring model description
//! GET  /brands/database  the brand database
//! ```
//!
//! Every non-2xx response carries the uniform `{"detail": ...}` body.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;

use crate::common::types::{
    BatchItem, BatchResponse, DetectionResult, ErrorBody, HealthResponse, ModelInfo, ServiceInfo,
};
use crate::detection::{DetectError, DetectionEngine};

use super::config::Limits;
use super::metrics::{ServiceMetrics, SystemProbe};

/// Shared state behind every handler.
pub struct AppState {
    engine: Arc<DetectionEngine>,
    limits: Limits,
    metrics: ServiceMetrics,
    probe: SystemProbe,
    started: Instant,
}

impl AppState {
    pub fn new(engine: DetectionEngine, limits: Limits) -> Self {
        Self {
            engine: Arc::new(engine),
            limits,
            metrics: ServiceMetrics::new(),
            probe: SystemProbe::new(),
            started: Instant::now(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

fn detect_error(err: DetectError) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    api_error(status, err.to_string())
}

/// Build the service router on top of shared state.
pub fn router(state: Arc<AppState>) -> Router {
    // Leave headroom above a full batch of maximum-size images; per-image
    // limits are enforced by the engine.
    let body_limit =
        state.limits.max_image_bytes * state.limits.max_batch_size + 1024 * 1024;

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/analyze/batch", post(analyze_batch))
        .route("/model/info", get(model_info))
        .route("/brands/database", get(brands_database))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Product Origin Detection API".to_string(),
        status: "active".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_ready = state.engine.is_ready();
    Json(HealthResponse {
        status: if model_ready { "healthy" } else { "degraded" }.to_string(),
        model_ready,
        timestamp: Utc::now(),
        uptime_secs: state.started.elapsed().as_secs(),
        requests: state.metrics.snapshot(),
        system: state.probe.sample(),
    })
}

async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    Json(state.engine.model_info())
}

async fn brands_database(
    State(state): State<Arc<AppState>>,
) -> Json<crate::detection::BrandDatabase> {
    Json(state.engine.brands().clone())
}

/// One uploaded image field.
struct Upload {
    filename: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl Upload {
    fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false)
    }
}

async fn next_upload(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Option<Upload>, ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    format!("failed to read multipart data: {}", e),
                ))
            }
        };
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("failed to read image data: {}", e),
            )
        })?;
        return Ok(Some(Upload {
            filename,
            content_type,
            data: data.to_vec(),
        }));
    }
}

async fn run_analysis(
    engine: Arc<DetectionEngine>,
    data: Vec<u8>,
) -> Result<DetectionResult, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || engine.analyze(&data))
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("analysis task panicked: {}", e),
            )
        })?;
    outcome.map_err(detect_error)
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DetectionResult>, ApiError> {
    let request_id = rand::random::<u64>();

    let upload = next_upload(&mut multipart, "image")
        .await?
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "no image provided"))?;

    if !upload.is_image() {
        state.metrics.record_failure();
        return Err(api_error(StatusCode::BAD_REQUEST, "file must be an image"));
    }

    info!(
        "📤 Request #{} received image {} ({} bytes)",
        request_id,
        upload.filename.as_deref().unwrap_or("unnamed"),
        upload.data.len()
    );

    let result = match run_analysis(state.engine.clone(), upload.data).await {
        Ok(result) => result,
        Err(e) => {
            state.metrics.record_failure();
            return Err(e);
        }
    };

    state
        .metrics
        .record_success(result.processing_time_ms.unwrap_or(0.0));
    info!(
        "✅ Request #{} verdict: {} (confidence: {:.3})",
        request_id, result.is_israeli_product, result.confidence
    );

    Ok(Json(result))
}

async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let request_id = rand::random::<u64>();

    let mut uploads = Vec::new();
    while let Some(upload) = next_upload(&mut multipart, "images").await? {
        uploads.push(upload);
    }

    if uploads.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "no images provided"));
    }
    if uploads.len() > state.limits.max_batch_size {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("maximum {} images per batch", state.limits.max_batch_size),
        ));
    }

    info!(
        "📤 Batch #{} received {} images",
        request_id,
        uploads.len()
    );

    // Images are processed sequentially so results[i] always corresponds to
    // the i-th uploaded image.
    let mut results = Vec::with_capacity(uploads.len());
    for (index, upload) in uploads.into_iter().enumerate() {
        let filename = upload.filename.clone();
        let item = if !upload.is_image() {
            state.metrics.record_failure();
            BatchItem {
                index,
                filename,
                result: None,
                error: Some("file is not an image".to_string()),
            }
        } else {
            match run_analysis(state.engine.clone(), upload.data).await {
                Ok(result) => {
                    state
                        .metrics
                        .record_success(result.processing_time_ms.unwrap_or(0.0));
                    BatchItem {
                        index,
                        filename,
                        result: Some(result),
                        error: None,
                    }
                }
                Err((_, Json(body))) => {
                    state.metrics.record_failure();
                    warn!(
                        "Batch #{} image {} failed: {}",
                        request_id, index, body.detail
                    );
                    BatchItem {
                        index,
                        filename,
                        result: None,
                        error: Some(body.detail),
                    }
                }
            }
        };
        results.push(item);
    }

    Ok(Json(BatchResponse {
        total_processed: results.len(),
        results,
        timestamp: Utc::now(),
    }))
}
