//! One conversation turn: user text in, assistant message out.
//!
//! The agent runs on a freshly spawned task with a new execution context.
//! Every failure ends up as an assistant message; nothing escapes the turn.
//! Appending to the history is done by [`SessionHandle::run_turn`].
//!
//! [`SessionHandle::run_turn`]: super::SessionHandle::run_turn

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::agent::{Agent, AgentUnavailable, ExecutionContext};
use crate::api::types::TurnLogEntry;

use super::session::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    AwaitingResponse,
    Rendered,
    Failed,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Unavailable(#[from] AgentUnavailable),

    #[error("{0}")]
    Agent(String),

    #[error("{0}")]
    Task(String),
}

/// Final answer text or the reason the agent could not produce one.
pub type AgentReply = Result<String, TurnError>;

/// Everything one agent invocation produced.
#[derive(Debug)]
pub struct AgentRun {
    pub reply: AgentReply,
    pub log: Vec<TurnLogEntry>,
    pub warnings: Vec<String>,
}

impl AgentRun {
    pub fn failed(error: TurnError) -> Self {
        Self {
            reply: Err(error),
            log: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// `Rendered` or `Failed`
    pub state: TurnState,

    /// Assistant message appended to the session
    pub reply: Message,

    /// Error banner text, set only for failed turns
    pub banner: Option<String>,

    /// Warnings raised by tools during the turn
    pub warnings: Vec<String>,

    /// Steps the agent took
    pub log: Vec<TurnLogEntry>,
}

/// Run `agent` on `query` inside a single-shot task.
pub async fn invoke_agent(agent: Result<Arc<Agent>, AgentUnavailable>, query: String) -> AgentRun {
    let agent = match agent {
        Ok(agent) => agent,
        Err(e) => return AgentRun::failed(e.into()),
    };

    let handle = tokio::spawn(async move {
        let mut ctx = ExecutionContext::new();
        tracing::debug!(context = %ctx.id(), "Starting agent turn");
        let result = agent.run(&query, &mut ctx).await;
        let (log, warnings) = ctx.into_parts();
        (result, log, warnings)
    });

    match handle.await {
        Ok((result, log, warnings)) => AgentRun {
            reply: result.map_err(|e| TurnError::Agent(format!("{:#}", e))),
            log,
            warnings,
        },
        Err(e) => AgentRun::failed(TurnError::Task(e.to_string())),
    }
}

/// Turn an agent run into the assistant message for the session.
pub fn conclude(session_id: Uuid, run: AgentRun) -> TurnOutcome {
    let AgentRun {
        reply,
        log,
        warnings,
    } = run;
    match reply {
        Ok(answer) => TurnOutcome {
            state: TurnState::Rendered,
            reply: Message::assistant(answer),
            banner: None,
            warnings,
            log,
        },
        Err(e) => {
            tracing::error!(session = %session_id, "Turn failed: {}", e);
            TurnOutcome {
                state: TurnState::Failed,
                reply: Message::assistant(format!("Sorry, I ran into a problem: {}", e)),
                banner: Some(format!("An error occurred: {}", e)),
                warnings,
                log,
            }
        }
    }
}
