//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use advisor_core::{AgentError, ModelInfo, SessionId, SessionStore};
use stock_advisor::{
    RiskAssessment, RouteContext, SlotFrame, explain::ExplanationSummary, pipeline::Reply,
};

use crate::state::AppState;

const RESET_MESSAGE: &str = "Conversation reset. Ask me about a stock, sector or commodity.";

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub llm_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    #[serde(rename = "followup")]
    FollowUp,
    Answer,
    Error,
    Reset,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub kind: ReplyKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<SlotFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RouteContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExplanationSummary>,
}

impl ChatResponse {
    fn text(conversation_id: String, kind: ReplyKind, message: String) -> Self {
        Self {
            conversation_id,
            kind,
            message,
            slots: None,
            context: None,
            risk: None,
            summary: None,
        }
    }

    pub fn from_reply(conversation_id: String, reply: Reply) -> Self {
        match reply {
            Reply::FollowUp(question) => Self::text(conversation_id, ReplyKind::FollowUp, question),
            Reply::Error(message) => Self::text(conversation_id, ReplyKind::Error, message),
            Reply::Reset => Self::text(conversation_id, ReplyKind::Reset, RESET_MESSAGE.into()),
            Reply::Answer(output) => {
                let output = *output;
                Self {
                    conversation_id,
                    kind: ReplyKind::Answer,
                    message: output.advisor_text,
                    slots: Some(output.slots),
                    context: Some(output.context),
                    risk: output.risk,
                    summary: output.summary,
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: &AgentError) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.user_message(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        model: state.model.clone(),
        llm_connected,
    })
}

/// Models offered by the configured provider
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, ApiError> {
    state.provider.list_models().await.map(Json).map_err(|e| {
        tracing::warn!("Model listing failed: {}", e);
        api_error(StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE", &e)
    })
}

/// One conversational turn
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let id = payload
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .map_or_else(SessionId::new, SessionId::from_string);

    let handle = state
        .sessions
        .acquire(&id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR", &e))?;

    // Held for the whole turn so a concurrent request on the same id waits
    let mut session = handle.lock().await;
    let reply = state.pipeline.handle(&mut session.state, &payload.message).await;
    session.touch();
    tracing::info!(conversation = %id, turns = session.turns, awaiting = session.state.is_awaiting(), "Turn handled");
    drop(session);

    Ok(Json(ChatResponse::from_reply(id.to_string(), reply)))
}

/// Drop a conversation's state
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .sessions
        .delete(&SessionId::from_string(conversation_id))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR", &e))?;

    Ok(if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}
