//! Chat sessions and the per-turn conversation loop.

mod session;
mod store;
mod turn;

pub use session::{ChatSession, Message, MessageRole, GREETING};
pub(crate) use session::escape_html;
pub use store::{SessionHandle, SessionStore};
pub use turn::{
    conclude, invoke_agent, AgentReply, AgentRun, TurnError, TurnOutcome, TurnState,
};
