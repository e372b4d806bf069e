//! HTTP API for driving a visualization session.
//!
//! Every control endpoint answers with `applied` (was the action valid for
//! the current status) and the resulting snapshot. Invalid user data answers
//! 400 with `{"error": ...}`.
//!
//! # Endpoints
//!
//! - `GET /api/status` - Current snapshot
//! - `POST /api/algorithm` - Select an algorithm by id
//! - `POST /api/input` - Replace the input with structured JSON
//! - `POST /api/input/text` - Replace the input with custom text
//! - `POST /api/start-node` - Pick the traversal start node
//! - `POST /api/start`, `/api/pause`, `/api/resume`, `/api/stop`, `/api/reset`
//! - `POST /api/step/forward`, `/api/step/back`, `/api/seek`
//! - `POST /api/speed` - Change the delay between steps
//! - `GET /ws` - Event stream, see [`crate::websocket`]
//!
//! # Example
//!
//! ```no_run
//! use algoviz_engine::EngineConfig;
//! use algoviz_server::{create_router, AppState};
//!
//! # async fn example() {
//! let router = create_router(AppState::new(EngineConfig::default()));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use algoviz_engine::{
    AlgorithmInput, ControlOutcome, ControlSnapshot, ControlSurface, EngineConfig, NodeId,
    VizError,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::websocket::ws_handler;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for `POST /api/algorithm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmRequest {
    /// Algorithm id, e.g. `bubble_sort` or `bfs`.
    pub algorithm: String,
}

/// Request body for `POST /api/input`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRequest {
    /// The new input.
    pub input: AlgorithmInput,
}

/// Request body for `POST /api/input/text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextInputRequest {
    /// Custom input text, parsed for the selected algorithm.
    pub text: String,
}

/// Request body for `POST /api/start-node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartNodeRequest {
    /// Node the traversal begins from.
    pub node: NodeId,
}

/// Request body for `POST /api/speed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedRequest {
    /// Delay between steps in milliseconds.
    pub speed_ms: u64,
}

/// Request body for `POST /api/seek`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekRequest {
    /// Step index to jump to.
    pub index: usize,
}

/// Response body for every control endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    /// `false` if the action was ignored for the current status.
    pub applied: bool,
    /// Session state after the action.
    pub snapshot: ControlSnapshot,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP and WebSocket handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The session every request acts on.
    pub control: Arc<ControlSurface>,
}

impl AppState {
    /// Creates a new `AppState` with a fresh session.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            control: Arc::new(ControlSurface::new(config)),
        }
    }

    /// Creates a new `AppState` around an existing session.
    #[must_use]
    pub const fn with_control(control: Arc<ControlSurface>) -> Self {
        Self { control }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Handler error, mapped onto a status code.
#[derive(Debug)]
struct ApiError(VizError);

impl From<VizError> for ApiError {
    fn from(err: VizError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_user_error() {
            warn!(error = %self.0, "Rejected request");
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

type ApiResult = Result<Json<ControlResponse>, ApiError>;

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the router with every API route, the `/ws` stream, CORS and
/// request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handle_status))
        .route("/algorithm", post(handle_algorithm))
        .route("/input", post(handle_input))
        .route("/input/text", post(handle_text_input))
        .route("/start-node", post(handle_start_node))
        .route("/start", post(handle_start))
        .route("/pause", post(handle_pause))
        .route("/resume", post(handle_resume))
        .route("/stop", post(handle_stop))
        .route("/reset", post(handle_reset))
        .route("/step/forward", post(handle_step_forward))
        .route("/step/back", post(handle_step_back))
        .route("/seek", post(handle_seek))
        .route("/speed", post(handle_speed));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

async fn respond(control: &ControlSurface, outcome: ControlOutcome) -> ApiResult {
    Ok(Json(ControlResponse {
        applied: outcome.is_applied(),
        snapshot: control.snapshot().await,
    }))
}

/// Handler for `GET /api/status`.
async fn handle_status(State(state): State<Arc<AppState>>) -> Json<ControlSnapshot> {
    Json(state.control.snapshot().await)
}

async fn handle_algorithm(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AlgorithmRequest>,
) -> ApiResult {
    info!(algorithm = %request.algorithm, "Algorithm requested");
    let outcome = state.control.set_algorithm_by_name(&request.algorithm).await?;
    respond(&state.control, outcome).await
}

async fn handle_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InputRequest>,
) -> ApiResult {
    let outcome = state.control.set_input(request.input).await?;
    respond(&state.control, outcome).await
}

async fn handle_text_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextInputRequest>,
) -> ApiResult {
    let outcome = state.control.set_custom_input(&request.text).await?;
    respond(&state.control, outcome).await
}

async fn handle_start_node(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartNodeRequest>,
) -> ApiResult {
    let outcome = state.control.set_start_node(request.node).await?;
    respond(&state.control, outcome).await
}

/// Handler for `POST /api/start`. Records the current input afresh.
async fn handle_start(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.start().await?;
    if outcome.is_applied() {
        info!("Playback started over HTTP");
    }
    respond(&state.control, outcome).await
}

async fn handle_pause(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.pause().await?;
    respond(&state.control, outcome).await
}

async fn handle_resume(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.resume().await?;
    respond(&state.control, outcome).await
}

async fn handle_stop(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.stop().await?;
    respond(&state.control, outcome).await
}

async fn handle_reset(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.reset().await?;
    respond(&state.control, outcome).await
}

async fn handle_step_forward(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.step_forward().await?;
    respond(&state.control, outcome).await
}

async fn handle_step_back(State(state): State<Arc<AppState>>) -> ApiResult {
    let outcome = state.control.step_back().await?;
    respond(&state.control, outcome).await
}

async fn handle_seek(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeekRequest>,
) -> ApiResult {
    let outcome = state.control.seek(request.index).await?;
    respond(&state.control, outcome).await
}

async fn handle_speed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeedRequest>,
) -> ApiResult {
    let outcome = state.control.set_speed(request.speed_ms).await?;
    respond(&state.control, outcome).await
}

// ============================================================================
// Tests
// ============================================================================
