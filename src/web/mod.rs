use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ParserConfig;
use crate::diagnostics::CollectingReporter;
use crate::error::ConfigError;
use crate::parser::{HandParser, sort_hands};
use crate::record::HandRecord;
use crate::report::{
    ActionRow, HandRow, KeyMetrics, LedgerRow, PlayerRow, action_rows, player_rows,
    subject_ledger,
};
use crate::stats::SharedAggregator;

/// Hands uploaded under one id, with statistics kept up to date on insert.
struct Dataset {
    parser: HandParser,
    hands: RwLock<Vec<HandRecord>>,
    stats: SharedAggregator,
}

impl Dataset {
    fn new(parser: HandParser) -> Self {
        Self {
            parser,
            hands: RwLock::new(Vec::new()),
            stats: SharedAggregator::new(),
        }
    }

    /// Parses `text` and folds its hands in. Returns (parsed, failed).
    fn ingest(&self, text: &str) -> (usize, usize) {
        let reporter = Arc::new(CollectingReporter::new());
        let parser = self.parser.clone().with_reporter(reporter.clone());
        let parsed = parser.parse_batch(&[text]);
        parsed.par_iter().for_each(|hand| self.stats.ingest(hand));

        let count = parsed.len();
        let mut hands = self.hands.write();
        hands.extend(parsed);
        sort_hands(&mut hands);
        (count, reporter.failed_hands())
    }
}

#[derive(Clone)]
struct AppState {
    datasets: Arc<RwLock<HashMap<Uuid, Arc<Dataset>>>>,
}

impl AppState {
    fn new() -> Self {
        Self {
            datasets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn insert_dataset(&self, dataset: Dataset) -> (Uuid, Arc<Dataset>) {
        let id = Uuid::new_v4();
        let entry = Arc::new(dataset);
        self.datasets.write().insert(id, entry.clone());
        (id, entry)
    }

    fn get_dataset(&self, id: &Uuid) -> Option<Arc<Dataset>> {
        self.datasets.read().get(id).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct CreateDatasetRequest {
    text: String,
    currency: Option<String>,
    hero: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppendHandsRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct DatasetSummary {
    dataset_id: Uuid,
    hands: usize,
    added: usize,
    failed_hands: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("dataset not found")]
    NotFound,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("parsing task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Config(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Binds `addr` and serves the dataset API until the process exits.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router()).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/datasets", post(create_dataset))
        .route("/datasets/:id/hands", get(fetch_hands).post(append_hands))
        .route("/datasets/:id/players", get(fetch_players))
        .route("/datasets/:id/actions", get(fetch_actions))
        .route("/datasets/:id/ledger", get(fetch_ledger))
        .route("/datasets/:id/summary", get(fetch_summary));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn router() -> Router {
    build_router(AppState::new())
}

async fn health() -> &'static str {
    "ok"
}

async fn ingest_blocking(dataset: Arc<Dataset>, text: String) -> Result<(usize, usize), ApiError> {
    let counts = tokio::task::spawn_blocking(move || dataset.ingest(&text)).await?;
    Ok(counts)
}

async fn create_dataset(
    State(state): State<AppState>,
    Json(req): Json<CreateDatasetRequest>,
) -> Result<Json<DatasetSummary>, ApiError> {
    let defaults = ParserConfig::default();
    let config = ParserConfig::new(
        req.currency.unwrap_or(defaults.currency),
        req.hero.unwrap_or(defaults.subject),
    );
    let parser = HandParser::new(config)?;
    let (id, dataset) = state.insert_dataset(Dataset::new(parser));
    let (added, failed_hands) = ingest_blocking(dataset.clone(), req.text).await?;
    tracing::info!(%id, added, failed_hands, "dataset created");

    Ok(Json(DatasetSummary {
        dataset_id: id,
        hands: dataset.hands.read().len(),
        added,
        failed_hands,
    }))
}

async fn append_hands(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AppendHandsRequest>,
) -> Result<Json<DatasetSummary>, ApiError> {
    let dataset = state.get_dataset(&id).ok_or(ApiError::NotFound)?;
    let (added, failed_hands) = ingest_blocking(dataset.clone(), req.text).await?;

    Ok(Json(DatasetSummary {
        dataset_id: id,
        hands: dataset.hands.read().len(),
        added,
        failed_hands,
    }))
}

async fn fetch_players(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerRow>>, ApiError> {
    let dataset = state.get_dataset(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(player_rows(&dataset.stats.snapshot())))
}

async fn fetch_hands(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HandRow>>, ApiError> {
    let dataset = state.get_dataset(&id).ok_or(ApiError::NotFound)?;
    let rows = dataset.hands.read().iter().map(HandRow::from_hand).collect();
    Ok(Json(rows))
}

async fn fetch_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ActionRow>>, ApiError> {
    let dataset = state.get_dataset(&id).ok_or(ApiError::NotFound)?;
    let rows = action_rows(&dataset.hands.read());
    Ok(Json(rows))
}

async fn fetch_ledger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LedgerRow>>, ApiError> {
    let dataset = state.get_dataset(&id).ok_or(ApiError::NotFound)?;
    let rows = subject_ledger(&dataset.hands.read());
    Ok(Json(rows))
}

async fn fetch_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<KeyMetrics>, ApiError> {
    let dataset = state.get_dataset(&id).ok_or(ApiError::NotFound)?;
    let metrics = KeyMetrics::from_hands(&dataset.hands.read());
    Ok(Json(metrics))
}
