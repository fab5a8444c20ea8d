//! Agent module - the tool-calling weather agent.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt and the user's question
//! 2. Call the LLM with the weather tool available
//! 3. If the LLM requests a tool call, execute it and feed the result back
//! 4. Repeat until the LLM produces a final response or max iterations reached

mod agent_loop;
mod context;
mod prompt;
mod provider;

pub use agent_loop::Agent;
pub use context::ExecutionContext;
pub use prompt::build_system_prompt;
pub use provider::{AgentProvider, AgentUnavailable};
