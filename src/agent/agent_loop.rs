//! Core agent loop implementation.

use std::sync::Arc;

use crate::api::types::LogEntryType;
use crate::config::AgentSettings;
use crate::llm::{ChatMessage, CompletionOptions, LlmClient, Role, ToolCall};
use crate::tools::ToolRegistry;

use super::context::ExecutionContext;
use super::prompt::build_system_prompt;

/// The tool-calling agent. Configuration is fixed at construction.
pub struct Agent {
    settings: AgentSettings,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(settings: AgentSettings, llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self {
            settings,
            llm,
            tools,
        }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer `query`, calling tools as the model requests, and return the
    /// final answer text. Steps are recorded in `ctx`.
    pub async fn run(&self, query: &str, ctx: &mut ExecutionContext) -> anyhow::Result<String> {
        let mut messages = vec![
            ChatMessage::system(build_system_prompt(&self.tools)),
            ChatMessage::user(query),
        ];
        let tool_schemas = self.tools.get_tool_schemas();
        let options = CompletionOptions {
            temperature: self.settings.temperature,
        };

        for iteration in 0..self.settings.max_iterations {
            self.trace(ctx, LogEntryType::Thinking, format!("Model call {}", iteration + 1));

            let response = self
                .llm
                .chat_completion(&self.settings.model, &messages, Some(&tool_schemas), options)
                .await?;

            if let Some(tool_calls) = response.tool_calls.filter(|calls| !calls.is_empty()) {
                messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content.clone(),
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                for tool_call in &tool_calls {
                    self.trace(
                        ctx,
                        LogEntryType::ToolCall,
                        format!(
                            "Calling tool: {} with args: {}",
                            tool_call.function.name, tool_call.function.arguments
                        ),
                    );

                    let result_str = match self.execute_tool_call(tool_call, ctx).await {
                        Ok(output) => output,
                        Err(e) => format!("Error: {}", e),
                    };

                    self.trace(
                        ctx,
                        LogEntryType::ToolResult,
                        truncate_for_log(&result_str, 1000),
                    );
                    messages.push(ChatMessage::tool_result(tool_call.id.clone(), result_str));
                }

                continue;
            }

            match response.content.filter(|c| !c.trim().is_empty()) {
                Some(content) => {
                    self.trace(ctx, LogEntryType::Response, truncate_for_log(&content, 2000));
                    return Ok(content);
                }
                None => {
                    ctx.record(LogEntryType::Error, "LLM returned empty response");
                    return Err(anyhow::anyhow!("LLM returned empty response"));
                }
            }
        }

        ctx.record(LogEntryType::Error, "Max iterations reached");
        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without completion",
            self.settings.max_iterations
        ))
    }

    async fn execute_tool_call(
        &self,
        tool_call: &ToolCall,
        ctx: &mut ExecutionContext,
    ) -> anyhow::Result<String> {
        let args: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)
            .map_err(|e| anyhow::anyhow!("Invalid tool arguments: {}", e))?;

        self.tools
            .execute(&tool_call.function.name, args, ctx)
            .await
    }

    fn trace(&self, ctx: &mut ExecutionContext, entry_type: LogEntryType, content: String) {
        if self.settings.verbose {
            tracing::info!(context = %ctx.id(), step = ?entry_type, "{}", content);
        } else {
            tracing::debug!(context = %ctx.id(), step = ?entry_type, "{}", content);
        }
        ctx.record(entry_type, content);
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
