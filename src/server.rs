// 🌐 API Server - the aggregation over HTTP
// Same operations as the CLI, for visualization front-ends

use crate::error::AggregationError;
use crate::instruction::Instruction;
use crate::report::AggregationReport;
use crate::row::{M52Row, RawM52Row};
use crate::rules::{RuleDefinition, RuleTable};
use crate::VERSION;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    rules: Arc<RuleTable>,
}

impl AppState {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        AppState { rules }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn error_response(err: AggregationError) -> Response {
    let status = match &err {
        AggregationError::UnknownRuleReference(_) => StatusCode::NOT_FOUND,
        AggregationError::MalformedRow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(%status, "request failed: {}", err);

    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(err.to_string()),
        }),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    rules: usize,
    fingerprint: String,
}

#[derive(Serialize)]
struct RuleSummary {
    id: String,
    label: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "OK",
        version: VERSION,
        rules: state.rules.len(),
        fingerprint: state.rules.fingerprint(),
    })
}

/// GET /api/rules - Rule ids and labels
async fn list_rules(State(state): State<AppState>) -> Response {
    let rules: Vec<RuleSummary> = state
        .rules
        .iter()
        .map(|rule| RuleSummary {
            id: rule.id.to_string(),
            label: rule.label.clone(),
        })
        .collect();

    ApiResponse::ok(rules)
}

/// GET /api/rules/:id - One full definition
async fn get_rule(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.rules.get(&id) {
        Ok(rule) => ApiResponse::<RuleDefinition>::ok(rule.clone()),
        Err(err) => error_response(err),
    }
}

/// POST /api/aggregate - Body: JSON array of M52 rows
async fn aggregate(State(state): State<AppState>, Json(raw_rows): Json<Vec<RawM52Row>>) -> Response {
    let rows = match raw_rows
        .into_iter()
        .map(M52Row::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(rows) => rows,
        Err(err) => return error_response(err),
    };

    let instruction = Instruction::from_rows(rows);
    let aggregation = state.rules.aggregate(&instruction);
    tracing::info!(rows = instruction.len(), "aggregation served");

    ApiResponse::ok(AggregationReport::from_aggregation(&aggregation))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/rules", get(list_rules))
        .route("/rules/:id", get(get_rule))
        .route("/aggregate", post(aggregate))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process stops
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
