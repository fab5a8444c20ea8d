//! In-memory session store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::agent::AgentProvider;

use super::session::{ChatSession, Message};
use super::turn::{conclude, invoke_agent, AgentRun, TurnError, TurnOutcome, TurnState};

/// Handle to one live session.
///
/// History and the turn gate are locked separately so readers see the user's
/// message while the agent is still working.
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    session: Arc<RwLock<ChatSession>>,
    turn: Arc<Mutex<()>>,
}

impl SessionHandle {
    fn new(session: ChatSession) -> Self {
        Self {
            id: session.id(),
            session: Arc::new(RwLock::new(session)),
            turn: Arc::new(Mutex::new(())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `AwaitingResponse` while a turn is in flight, else `Idle`.
    pub fn state(&self) -> TurnState {
        match self.turn.try_lock() {
            Ok(_) => TurnState::Idle,
            Err(_) => TurnState::AwaitingResponse,
        }
    }

    /// Claim the turn gate, or `None` if a turn is already in flight.
    pub fn try_begin_turn(&self) -> Option<OwnedMutexGuard<()>> {
        self.turn.clone().try_lock_owned().ok()
    }

    pub async fn snapshot(&self) -> ChatSession {
        self.session.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.session.read().await.messages().to_vec()
    }

    /// Run one turn. Returns `None` if another turn is still in flight.
    ///
    /// The turn runs on its own task holding the gate, so it still appends
    /// both messages if the caller stops waiting.
    pub async fn run_turn(&self, agents: &AgentProvider, text: &str) -> Option<TurnOutcome> {
        let gate = self.try_begin_turn()?;
        let agent = agents.get();
        let session = self.session.clone();
        let id = self.id;
        let text = text.to_string();

        let task = tokio::spawn(async move {
            let _gate = gate;
            session.write().await.push(Message::user(text.clone()));

            let outcome = conclude(id, invoke_agent(agent, text).await);

            session.write().await.push(outcome.reply.clone());
            outcome
        });

        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(session = %self.id, "Turn task aborted: {}", e);
                Some(conclude(self.id, AgentRun::failed(TurnError::Task(e.to_string()))))
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionHandle {
        let handle = SessionHandle::new(ChatSession::new());
        self.sessions
            .write()
            .await
            .insert(handle.id, handle.clone());
        tracing::debug!(session = %handle.id, "Created chat session");
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(session = %id, "Ended chat session");
        }
        removed
    }
}
