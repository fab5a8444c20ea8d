//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{Message, TurnState};

/// Request to post a user message to a session.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    /// The user's prompt
    pub content: String,
}

/// Response after creating a session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    /// Unique session identifier
    pub id: Uuid,

    /// Initial history (the greeting)
    pub messages: Vec<Message>,
}

/// Current state of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,

    pub created_at: DateTime<Utc>,

    pub messages: Vec<Message>,

    /// True while a turn is awaiting the agent's response
    pub thinking: bool,
}

/// Result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    /// `rendered` or `failed`
    pub status: TurnState,

    /// Assistant message appended by this turn
    pub message: Message,

    /// Error banner to show above the chat, for failed turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Warnings raised by tools during the turn
    pub warnings: Vec<String>,

    /// Steps the agent took to produce the reply
    pub log: Vec<TurnLogEntry>,

    /// Full history after the turn
    pub messages: Vec<Message>,
}

/// A single entry in a turn's execution log.
#[derive(Debug, Clone, Serialize)]
pub struct TurnLogEntry {
    /// Timestamp (RFC 3339)
    pub timestamp: String,

    /// Entry type
    pub entry_type: LogEntryType,

    /// Content of the entry
    pub content: String,
}

/// Types of log entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    /// Agent is calling the model
    Thinking,
    /// Tool is being called
    ToolCall,
    /// Tool returned a result
    ToolResult,
    /// Agent produced final response
    Response,
    /// An error occurred
    Error,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Model the agent is bound to
    pub model: String,

    /// False when required credentials are missing
    pub ready: bool,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
