// Account Gateway Service - HTTP entry point
// Exposes the account engine's commands and queries as a JSON API

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use account_core::{CommandHandler, Config, Metrics, QueryHandler, Storage};

pub mod api;
pub mod error;

use api::{AccountResponse, DepositMoneyRequest, OpenAccountRequest, WithdrawMoneyRequest};
use error::ApiError;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<CommandHandler<Storage>>,
    pub queries: Arc<QueryHandler<Storage>>,
    pub storage: Arc<Storage>,
    pub metrics: Arc<Metrics>,
    pub max_attempts: u32,
}

impl AppState {
    /// Wire command and query handlers over one storage instance
    pub fn new(storage: Arc<Storage>, metrics: Arc<Metrics>, config: &Config) -> Self {
        Self {
            commands: Arc::new(CommandHandler::new(storage.clone(), metrics.clone())),
            queries: Arc::new(QueryHandler::new(storage.clone(), metrics.clone())),
            storage,
            metrics,
            max_attempts: config.command.max_attempts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub store_ok: bool,
    pub events: u64,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/accounts", post(open_account))
        .route("/api/v1/accounts/:account_id", get(get_account))
        .route("/api/v1/accounts/:account_id/deposits", put(deposit_money))
        .route("/api/v1/accounts/:account_id/withdraws", put(withdraw_money))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// POST /api/v1/accounts - open a new account
async fn open_account(
    State(state): State<AppState>,
    Json(request): Json<OpenAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = request.validate()?;
    let commands = state.commands.clone();

    // Account ids are generated fresh, so an open cannot lose a write
    // race against itself and gets a single attempt
    let event = tokio::task::spawn_blocking(move || commands.handle(&command))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    info!("Opened account {}", event.account_id());
    let location = format!("/api/v1/accounts/{}", event.account_id());
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

// PUT /api/v1/accounts/:account_id/deposits - deposit money
async fn deposit_money(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<DepositMoneyRequest>,
) -> Result<StatusCode, ApiError> {
    let command = request.validate(&account_id)?;
    let commands = state.commands.clone();
    let max_attempts = state.max_attempts;

    tokio::task::spawn_blocking(move || commands.handle_with_retries(&command, max_attempts))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    Ok(StatusCode::ACCEPTED)
}

// PUT /api/v1/accounts/:account_id/withdraws - withdraw money
async fn withdraw_money(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<WithdrawMoneyRequest>,
) -> Result<StatusCode, ApiError> {
    let command = request.validate(&account_id)?;
    let commands = state.commands.clone();
    let max_attempts = state.max_attempts;

    tokio::task::spawn_blocking(move || commands.handle_with_retries(&command, max_attempts))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    Ok(StatusCode::ACCEPTED)
}

// GET /api/v1/accounts/:account_id - current balance and owner
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = api::parse_account_id(&account_id)?;
    let queries = state.queries.clone();

    let account = tokio::task::spawn_blocking(move || queries.get_account(account_id))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    Ok(Json(AccountResponse::from(account)))
}

// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let events = state.storage.approximate_event_count();
    let store_ok = events.is_ok();

    Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" },
        service: "account-gateway",
        version: env!("CARGO_PKG_VERSION"),
        store_ok,
        events: events.unwrap_or(0),
    })
}

// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to export metrics: {}", e)))
}
