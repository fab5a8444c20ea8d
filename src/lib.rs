//! # Weather Chat
//!
//! A chat service that answers questions about the current weather.
//!
//! This library provides:
//! - An HTTP server with a single chat view and session endpoints
//! - A tool-calling agent that can look up weather via OpenWeatherMap
//! - Integration with Groq for LLM access
//!
//! ## Architecture
//!
//! Each user message is one turn:
//! 1. The message is appended to the session's history
//! 2. The shared agent runs on a fresh execution context
//! 3. The agent calls the LLM, executes any weather lookups, and feeds the
//!    results back until it has an answer
//! 4. The answer, or an apology carrying the failure reason, is appended to
//!    the history
//!
//! ## Example
//!
//! ```rust,ignore
//! use weather_chat::{agent::AgentProvider, chat::SessionStore, config::Config};
//!
//! let config = Config::from_env()?;
//! let agents = AgentProvider::new(config);
//! let session = SessionStore::new().create().await;
//! let outcome = session.run_turn(&agents, "What's the weather in London?").await;
//! ```

pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use config::Config;
