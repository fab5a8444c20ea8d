//! Shared helpers for unit tests: local mock servers and a scripted LLM.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use crate::llm::{
    ChatMessage, ChatResponse, CompletionOptions, FunctionCall, LlmClient, Role, ToolCall,
    ToolDefinition,
};

/// Serve `app` on an ephemeral local port.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// URL on a local port nothing listens on.
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, path)
}

/// One scripted model step.
pub enum Step {
    Reply(String),
    CallTool { name: String, arguments: String },
    /// Reply with a sentence built from the most recent tool result.
    SummarizeTool,
    Fail(String),
    /// Reply after waiting `delay`.
    Slow { reply: String, delay: Duration },
}

/// LLM client that replays a fixed script and records what it was sent.
#[derive(Default)]
pub struct ScriptedLlm {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _tools: Option<&[ToolDefinition]>,
        _options: CompletionOptions,
    ) -> anyhow::Result<ChatResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Step::Reply("script exhausted".to_string()));

        match step {
            Step::Reply(text) => Ok(ChatResponse {
                content: Some(text),
                tool_calls: None,
            }),
            Step::CallTool { name, arguments } => {
                let n = self.requests.lock().unwrap().len();
                Ok(ChatResponse {
                    content: None,
                    tool_calls: Some(vec![ToolCall {
                        id: format!("call_{}", n),
                        call_type: "function".to_string(),
                        function: FunctionCall { name, arguments },
                    }]),
                })
            }
            Step::SummarizeTool => {
                let record: serde_json::Value = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::Tool)
                    .and_then(|m| m.content.as_deref())
                    .and_then(|c| serde_json::from_str(c).ok())
                    .unwrap_or_default();
                Ok(ChatResponse {
                    content: Some(format!(
                        "It is currently {} and {}°C in {}.",
                        record["weather"][0]["description"].as_str().unwrap_or("unknown"),
                        record["main"]["temp"],
                        record["name"].as_str().unwrap_or("that city"),
                    )),
                    tool_calls: None,
                })
            }
            Step::Fail(reason) => Err(anyhow::anyhow!(reason)),
            Step::Slow { reply, delay } => {
                tokio::time::sleep(delay).await;
                Ok(ChatResponse {
                    content: Some(reply),
                    tool_calls: None,
                })
            }
        }
    }
}
