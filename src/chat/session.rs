//! Chat history of one UI session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const GREETING: &str = "Hi! How can I help you with the weather today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only, ordered message list. The first message is always the
/// assistant greeting.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: vec![Message::assistant(GREETING)],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Render the transcript as HTML, in insertion order.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                format!(
                    "<div class=\"msg {role}\"><span class=\"role\">{role}</span><div class=\"content\">{content}</div></div>",
                    role = m.role.as_str(),
                    content = escape_html(&m.content)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages(), &[Message::assistant(GREETING)]);
    }

    #[test]
    fn render_is_idempotent_and_ordered() {
        let mut session = ChatSession::new();
        session.push(Message::user("Weather in <Rome>?"));
        session.push(Message::assistant("Sunny & 25°C"));

        let first = session.render();
        let second = session.render();
        assert_eq!(first, second);
        assert_eq!(session.messages().len(), 3);

        let greeting = first.find(GREETING).unwrap();
        let question = first.find("Weather in &lt;Rome&gt;?").unwrap();
        let answer = first.find("Sunny &amp; 25°C").unwrap();
        assert!(greeting < question && question < answer);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
