//! Uniform response envelope returned by every client-level operation.

use serde::{Deserialize, Serialize};

/// Severity of an advisory message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Info,
    Warning,
    Error,
}

impl MessageType {
    pub fn label(&self) -> &'static str {
        match self {
            MessageType::Info => "INFO",
            MessageType::Warning => "WARNING",
            MessageType::Error => "ERROR",
        }
    }
}

/// Non-fatal annotation attached to a successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
}

impl ApiMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Info,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Error,
            content: content.into(),
        }
    }
}

impl std::fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.content)
    }
}

/// `{ data, messages }` wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: ApiMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            messages: self.messages,
        }
    }
}

/// Append the `Messages:` section to a tool response, if there is anything to say
pub fn append_messages(text: &mut String, messages: &[ApiMessage]) {
    if messages.is_empty() {
        return;
    }
    text.push_str("\n\nMessages:\n");
    let lines: Vec<String> = messages.iter().map(ToString::to_string).collect();
    text.push_str(&lines.join("\n"));
}
