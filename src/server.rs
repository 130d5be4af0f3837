use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::alert::engine::{deliver_alerts, forward_alerts};
use crate::alert::sink::{AlertSink, StdoutSink, WebhookSink};
use crate::config::Config;
use crate::estimate::material::{estimate_material, MaterialPricing, ZoneSpec};
use crate::estimate::sealcoat::{estimate_sealcoat, SealcoatInput, SealcoatPricing};
use crate::estimate::striping::{estimate_striping, PaintTable, StripingInput};
use crate::estimate::{Estimate, EstimateError};
use crate::performance::monitor::PerformanceMonitor;
use crate::performance::{PerformanceAlert, Severity};
use crate::store::sqlite::SqliteStore;
use crate::store::{list_estimates, load_estimate, save_estimate, SavedEstimate, Store};

#[derive(Clone)]
struct ApiState {
    config: Config,
    monitor: Arc<Mutex<PerformanceMonitor>>,
    store: Arc<dyn Store>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<EstimateError> for ApiError {
    fn from(value: EstimateError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;
type Body<T> = std::result::Result<Json<T>, JsonRejection>;

fn read_body<T>(payload: Body<T>) -> std::result::Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let message = rejection.body_text();
            let unknown_name = matches!(rejection, JsonRejection::JsonDataError(_))
                && message.contains("unknown variant");
            let err = if unknown_name {
                EstimateError::Configuration(message)
            } else {
                EstimateError::Validation(message)
            };
            Err(err.into())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SealcoatRequest {
    input: SealcoatInput,
    pricing: Option<SealcoatPricing>,
    save_as: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct StripingRequest {
    input: StripingInput,
    paint: Option<PaintTable>,
    save_as: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaterialRequest {
    zones: Vec<ZoneSpec>,
    pricing: Option<MaterialPricing>,
    save_as: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SampleRequest {
    metric: String,
    value: f64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct SampleResponse {
    alert: Option<PerformanceAlert>,
    score: u32,
}

#[derive(Debug, Serialize)]
struct ScoreResponse {
    score: u32,
    violations: Vec<ViolationEntry>,
}

#[derive(Debug, Serialize)]
struct ViolationEntry {
    metric: String,
    severity: Severity,
}

#[derive(Debug, Serialize)]
struct AlertsResponse {
    alerts: Vec<PerformanceAlert>,
}

#[derive(Debug, Serialize)]
struct SavedResponse {
    estimates: Vec<SavedEstimate>,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&config.resolved_db_path())?);
    let monitor = config.build_monitor();
    let sinks = build_sinks(&config)?;
    if !sinks.is_empty() {
        let (_subscription, rx) = forward_alerts(&monitor, config.alerts.rules.clone());
        tokio::spawn(async move {
            let delivered = deliver_alerts(rx, &sinks).await;
            info!("alert delivery stopped after {delivered} alerts");
        });
    }

    let state = ApiState {
        config,
        monitor: Arc::new(Mutex::new(monitor)),
        store,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_sinks(config: &Config) -> Result<Vec<Box<dyn AlertSink>>> {
    let mut sinks: Vec<Box<dyn AlertSink>> = Vec::new();
    if config.alerts.enable_stdout {
        sinks.push(Box::new(StdoutSink));
    }
    if !config.alerts.webhook_url.trim().is_empty() {
        sinks.push(Box::new(WebhookSink::new(config.alerts.webhook_url.clone())?));
    }
    Ok(sinks)
}

fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/estimates/sealcoat", post(sealcoat))
        .route("/v1/estimates/striping", post(striping))
        .route("/v1/estimates/material", post(material))
        .route("/v1/performance/samples", post(record_sample))
        .route("/v1/performance/score", get(score))
        .route("/v1/performance/alerts", get(alerts))
        .route("/v1/saved", get(saved))
        .route("/v1/saved/:name", get(saved_by_name))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse { status: "ok" })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn sealcoat(
    State(state): State<ApiState>,
    payload: Body<SealcoatRequest>,
) -> ApiResult<Estimate> {
    let request = read_body(payload)?;
    let pricing = request.pricing.unwrap_or_else(|| state.config.sealcoat.clone());
    let estimate: Estimate = estimate_sealcoat(&request.input, &pricing)?.into();
    persist_if_requested(&state, request.save_as.as_deref(), &estimate)?;
    Ok(ok(estimate))
}

async fn striping(
    State(state): State<ApiState>,
    payload: Body<StripingRequest>,
) -> ApiResult<Estimate> {
    let request = read_body(payload)?;
    let paint = request.paint.unwrap_or_else(|| state.config.striping.clone());
    let estimate: Estimate = estimate_striping(&request.input, &paint)?.into();
    persist_if_requested(&state, request.save_as.as_deref(), &estimate)?;
    Ok(ok(estimate))
}

async fn material(
    State(state): State<ApiState>,
    payload: Body<MaterialRequest>,
) -> ApiResult<Estimate> {
    let request = read_body(payload)?;
    let pricing = request.pricing.unwrap_or_else(|| state.config.material.clone());
    let estimate: Estimate = estimate_material(&request.zones, &pricing)?.into();
    persist_if_requested(&state, request.save_as.as_deref(), &estimate)?;
    Ok(ok(estimate))
}

async fn record_sample(
    State(state): State<ApiState>,
    payload: Body<SampleRequest>,
) -> ApiResult<SampleResponse> {
    let request = read_body(payload)?;
    let mut monitor = state.monitor.lock().unwrap_or_else(PoisonError::into_inner);
    let alert = monitor.record_sample(&request.metric, request.value);
    Ok(ok(SampleResponse {
        alert,
        score: monitor.score(),
    }))
}

async fn score(State(state): State<ApiState>) -> Json<ApiResponse<ScoreResponse>> {
    let monitor = state.monitor.lock().unwrap_or_else(PoisonError::into_inner);
    let violations = monitor
        .violations()
        .iter()
        .map(|(metric, severity)| ViolationEntry {
            metric: metric.clone(),
            severity: *severity,
        })
        .collect();
    ok(ScoreResponse {
        score: monitor.score(),
        violations,
    })
}

async fn alerts(State(state): State<ApiState>) -> Json<ApiResponse<AlertsResponse>> {
    let monitor = state.monitor.lock().unwrap_or_else(PoisonError::into_inner);
    ok(AlertsResponse {
        alerts: monitor.recent_alerts(),
    })
}

async fn saved(State(state): State<ApiState>) -> ApiResult<SavedResponse> {
    let estimates = list_estimates(state.store.as_ref()).map_err(ApiError::internal)?;
    Ok(ok(SavedResponse { estimates }))
}

async fn saved_by_name(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> ApiResult<SavedEstimate> {
    match load_estimate(state.store.as_ref(), &name).map_err(ApiError::internal)? {
        Some(saved) => Ok(ok(saved)),
        None => Err(ApiError::not_found(format!("no saved estimate named {name}"))),
    }
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn persist_if_requested(
    state: &ApiState,
    name: Option<&str>,
    estimate: &Estimate,
) -> std::result::Result<(), ApiError> {
    let Some(name) = name else {
        return Ok(());
    };
    save_estimate(state.store.as_ref(), name, estimate).map_err(|err| {
        warn!("failed saving estimate {name}: {err}");
        ApiError::internal(err)
    })?;
    Ok(())
}
