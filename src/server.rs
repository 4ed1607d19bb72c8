//! HTTP surface of the answer service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/query` | Answer a question from retrieved context |
//! | `POST` | `/seed` | Populate the vector store with the reference corpus |
//! | `GET`  | `/health` | Liveness probe (returns version) |
//!
//! # Error Contract
//!
//! Validation failures return a JSON envelope:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must be at least 3 characters" } }
//! ```
//!
//! The pipeline itself never fails a request: upstream outages surface as
//! degraded answers, and `/seed` reports upsert failures in its body with
//! status 200.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::answer::AnswerPipeline;
use crate::config::Config;
use crate::embedding::{Embedder, HttpEmbeddingClient};
use crate::generation::HttpGenerationClient;
use crate::models::{AnswerResponse, QueryRequest, SeedReport};
use crate::retrieval::Retriever;
use crate::seed::{Pacing, Seeder};
use crate::store::create_store;

/// Minimum question length, in characters.
const MIN_QUESTION_CHARS: usize = 3;

/// Shared application state passed to all route handlers.
///
/// Every provider client is constructed once here and injected; handlers
/// share them across concurrent requests without locking (nothing mutates
/// after construction).
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnswerPipeline>,
    pub seeder: Arc<Seeder>,
}

impl AppState {
    /// Wire the full pipeline from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let embedder = Embedder::new(Arc::new(HttpEmbeddingClient::new(&config.embedding)?));
        let store = create_store(&config.store)?;
        let generation = Arc::new(HttpGenerationClient::new(&config.generation)?);

        let retriever = Retriever::new(embedder.clone(), store.clone(), config.store.top_k);
        let pipeline = Arc::new(AnswerPipeline::new(retriever, generation));
        let seeder = Arc::new(Seeder::new(
            embedder,
            store,
            Pacing::new(Duration::from_millis(config.seeding.pause_ms)),
        ));

        Ok(Self { pipeline, seeder })
    }
}

/// Build the router. Separate from [`run_server`] so tests can drive
/// handlers in-process.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/query", post(handle_query))
        .route("/seed", post(handle_seed))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error envelope.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"healthy"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

/// Handler for `GET /health`.
///
/// Static liveness probe — no dependency on the pipeline or any upstream
/// service.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /query ============

/// Handler for `POST /query`.
///
/// Validates the question, then runs the full retrieve-and-generate chain.
/// The chain itself cannot fail; the only error path is validation.
async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    if request.question.chars().count() < MIN_QUESTION_CHARS {
        return Err(bad_request(format!(
            "question must be at least {} characters",
            MIN_QUESTION_CHARS
        )));
    }

    Ok(Json(state.pipeline.answer(&request.question).await))
}

// ============ POST /seed ============

/// Handler for `POST /seed`.
///
/// Always 200; the report's `status` field carries the outcome, with
/// `detail` on upsert failure.
async fn handle_seed(State(state): State<AppState>) -> Json<SeedReport> {
    Json(state.seeder.seed().await)
}
