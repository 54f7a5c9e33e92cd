use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use shared::database::DatabaseConnection;
use shared::entity::trades;
use shared::models::TradeRequest;
use shared::services::trade_service;
use shared::{Config, Notifier, TradeError};

#[derive(Clone)]
struct AppState {
    db: DatabaseConnection,
    notifier: Option<Notifier>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting trade API server...");

    let config = Config::from_env()?;
    let db = shared::connect(&config).await?;
    info!("Connected to database");

    let state = AppState {
        db,
        notifier: Notifier::from_config(&config),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/trades", post(create_trade))
        .route("/api/trades/active", get(list_active_trades))
        .route("/api/trades/:id", get(get_trade))
        .route("/api/users/:user_id/trades", get(list_user_trades))
        .route("/api/signals/:id/process", post(process_signal))
        .route("/api/signals/:id/activate", post(activate_signal))
        .route("/api/signals/:id/deactivate", post(deactivate_signal))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.api_bind_addr).await?;
    info!("API server listening on http://{}", config.api_bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_trade(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Response {
    match trade_service::create_trade(&state.db, request).await {
        Ok(trade) => {
            if let Some(notifier) = &state.notifier {
                notifier.trade_created(&trade);
            }
            (StatusCode::CREATED, Json(TradeResponse::from(trade))).into_response()
        }
        Err(e) => trade_error_response(e),
    }
}

async fn process_signal(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match trade_service::process_signal(&state.db, id, state.notifier.as_ref()).await {
        Ok(success) => Json(json!({ "success": success })).into_response(),
        Err(e) => trade_error_response(e),
    }
}

async fn activate_signal(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match trade_service::activate_generation(&state.db, id).await {
        Ok(generation) => {
            Json(json!({ "id": generation.id, "status": generation.status })).into_response()
        }
        Err(e) => trade_error_response(e),
    }
}

async fn deactivate_signal(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match trade_service::deactivate_generation(&state.db, id).await {
        Ok(generation) => Json(json!({ "id": generation.id, "is_active": generation.is_active }))
            .into_response(),
        Err(e) => trade_error_response(e),
    }
}

async fn get_trade(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match trade_service::get_trade(&state.db, id).await {
        Ok(Some(trade)) => Json(TradeResponse::from(trade)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "detail": format!("trade {}", id) })),
        )
            .into_response(),
        Err(e) => trade_error_response(e),
    }
}

#[derive(Deserialize)]
struct ListParams {
    limit: Option<u64>,
}

async fn list_user_trades(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Response {
    match trade_service::list_trades_by_user(&state.db, user_id, params.limit).await {
        Ok(trades) => Json(
            trades
                .into_iter()
                .map(TradeResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => trade_error_response(e),
    }
}

async fn list_active_trades(State(state): State<AppState>) -> Response {
    match trade_service::list_active_trades(&state.db).await {
        Ok(trades) => Json(
            trades
                .into_iter()
                .map(TradeResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => trade_error_response(e),
    }
}

/// Deliberate rejections, invalid input and technical failures land on
/// distinct status codes so clients can choose their remediation.
fn trade_error_response(err: TradeError) -> Response {
    let (status, kind) = match &err {
        TradeError::Risk(_) => (StatusCode::UNPROCESSABLE_ENTITY, "risk_rejected"),
        TradeError::Compliance(_) => (StatusCode::FORBIDDEN, "compliance_rejected"),
        TradeError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        TradeError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
        TradeError::Technical(_) if err.is_duplicate_key() => {
            (StatusCode::CONFLICT, "duplicate_request_key")
        }
        TradeError::Technical(_) => (StatusCode::SERVICE_UNAVAILABLE, "technical_failure"),
    };
    if status == StatusCode::SERVICE_UNAVAILABLE {
        error!("Trade operation failed: {}", err);
    }
    (
        status,
        Json(json!({ "error": kind, "detail": err.to_string() })),
    )
        .into_response()
}

#[derive(Serialize)]
struct TradeResponse {
    id: u64,
    user_id: i64,
    strategy_id: Option<u64>,
    signal_id: Option<u64>,
    request_key: String,
    symbol: String,
    exchange: String,
    side: String,
    quantity: Decimal,
    entry_price: Decimal,
    exit_price: Option<Decimal>,
    stop_loss: Option<Decimal>,
    take_profit: Option<Decimal>,
    status: String,
    pnl: Option<Decimal>,
    risk_reduced: bool,
    risk_reduction_qty: Option<Decimal>,
    is_active: bool,
    created_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

impl From<trades::Model> for TradeResponse {
    fn from(trade: trades::Model) -> Self {
        Self {
            id: trade.id,
            user_id: trade.user_id,
            strategy_id: trade.strategy_id,
            signal_id: trade.signal_id,
            request_key: trade.request_key,
            symbol: trade.symbol,
            exchange: trade.exchange,
            side: trade.side,
            quantity: trade.quantity,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            stop_loss: trade.stop_loss,
            take_profit: trade.take_profit,
            status: trade.status,
            pnl: trade.pnl,
            risk_reduced: trade.risk_reduced,
            risk_reduction_qty: trade.risk_reduction_qty,
            is_active: trade.is_active,
            created_at: trade.created_at,
            closed_at: trade.closed_at,
        }
    }
}
