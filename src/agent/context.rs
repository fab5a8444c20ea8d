//! Per-turn execution context.
//!
//! A context is created fresh for every user turn, handed to the agent and
//! its tools for that turn only, and dropped once the reply is obtained.

use chrono::Utc;
use uuid::Uuid;

use crate::api::types::{LogEntryType, TurnLogEntry};

#[derive(Debug)]
pub struct ExecutionContext {
    id: Uuid,
    log: Vec<TurnLogEntry>,
    warnings: Vec<String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            log: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a step to the turn log.
    pub fn record(&mut self, entry_type: LogEntryType, content: impl Into<String>) {
        self.log.push(TurnLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            entry_type,
            content: content.into(),
        });
    }

    /// Raise a user-visible warning for this turn.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn log(&self) -> &[TurnLogEntry] {
        &self.log
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the context, yielding the step log and the warnings.
    pub fn into_parts(self) -> (Vec<TurnLogEntry>, Vec<String>) {
        (self.log, self.warnings)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_context_is_distinct() {
        let a = ExecutionContext::new();
        let b = ExecutionContext::new();
        assert_ne!(a.id(), b.id());
        assert!(a.log().is_empty());
        assert!(a.warnings().is_empty());
    }

    #[test]
    fn records_steps_and_warnings_in_order() {
        let mut ctx = ExecutionContext::new();
        ctx.record(LogEntryType::ToolCall, "get_weather");
        ctx.record(LogEntryType::Response, "done");
        ctx.warn("API Request Error: timeout");

        let kinds: Vec<_> = ctx.log().iter().map(|e| e.entry_type.clone()).collect();
        assert_eq!(kinds, vec![LogEntryType::ToolCall, LogEntryType::Response]);
        let (log, warnings) = ctx.into_parts();
        assert_eq!(log.len(), 2);
        assert_eq!(warnings, vec!["API Request Error: timeout".to_string()]);
    }
}
