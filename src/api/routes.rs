//! HTTP routes and server entry point.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::AgentProvider;
use crate::chat::{SessionHandle, SessionStore, TurnState};
use crate::config::Config;

use super::page::{chat_page, missing_credentials_page, MISSING_KEYS_ERROR};
use super::types::{
    CreateSessionResponse, ErrorResponse, HealthResponse, PostMessageRequest, SessionView,
    TurnResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            hint: None,
        }),
    )
}

/// Shared server state.
pub struct AppState {
    pub config: Config,
    pub agents: AgentProvider,
    pub sessions: SessionStore,
    missing: Vec<&'static str>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let agents = AgentProvider::new(config.clone());
        Self::with_agents(config, agents)
    }

    pub fn with_agents(config: Config, agents: AgentProvider) -> Self {
        let missing = config.missing_credentials();
        Self {
            config,
            agents,
            sessions: SessionStore::new(),
            missing,
        }
    }

    /// True when every required credential is configured.
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    fn ensure_ready(&self) -> Result<(), ApiError> {
        if self.is_ready() {
            return Ok(());
        }
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: MISSING_KEYS_ERROR.to_string(),
                hint: Some(format!(
                    "You need to set {} in your secrets.",
                    self.missing.join(" and ")
                )),
            }),
        ))
    }

    async fn session(&self, id: Uuid) -> Result<SessionHandle, ApiError> {
        self.ensure_ready()?;
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Session {} not found", id)))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/transcript", get(get_transcript))
        .route("/api/sessions/:id/messages", post(post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until it stops.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config));

    if !state.is_ready() {
        tracing::error!(
            missing = ?state.missing,
            "Required credentials are missing; chat input is disabled"
        );
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// GET / - The chat view, or the blocking error page.
async fn index(State(state): State<Arc<AppState>>) -> Response {
    if state.is_ready() {
        Html(chat_page()).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(missing_credentials_page(&state.missing)),
        )
            .into_response()
    }
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config.agent.model.clone(),
        ready: state.is_ready(),
    })
}

/// POST /api/sessions - Start a chat session.
async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    state.ensure_ready()?;
    let handle = state.sessions.create().await;
    Ok(Json(CreateSessionResponse {
        id: handle.id(),
        messages: handle.messages().await,
    }))
}

/// GET /api/sessions/:id
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state.session(id).await?;
    let thinking = handle.state() == TurnState::AwaitingResponse;
    let session = handle.snapshot().await;
    Ok(Json(SessionView {
        id,
        created_at: session.created_at(),
        messages: session.messages().to_vec(),
        thinking,
    }))
}

/// GET /api/sessions/:id/transcript - Rendered history.
async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let handle = state.session(id).await?;
    Ok(Html(handle.snapshot().await.render()))
}

/// DELETE /api/sessions/:id - End a session.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.ensure_ready()?;
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", id),
        ))
    }
}

/// POST /api/sessions/:id/messages - Run one turn.
async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let handle = state.session(id).await?;
    if req.content.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "content is required"));
    }

    let outcome = handle
        .run_turn(&state.agents, &req.content)
        .await
        .ok_or_else(|| {
            api_error(
                StatusCode::CONFLICT,
                "A response is still being generated for this session",
            )
        })?;

    Ok(Json(TurnResponse {
        status: outcome.state,
        message: outcome.reply,
        banner: outcome.banner,
        warnings: outcome.warnings,
        log: outcome.log,
        messages: handle.messages().await,
    }))
}
