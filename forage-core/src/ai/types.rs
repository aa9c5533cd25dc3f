//! Completion request and response types.
//!
//! Every generation stage sends one self-contained prompt, so a request is a
//! single user turn plus sampling settings.

use serde::{Deserialize, Serialize};

/// One prompt for the chat service.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// The full prompt text. Cache entries are keyed by its hash.
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the service for a JSON object reply.
    pub json_response: bool,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            json_response: false,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completion, fresh or served from the disk cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
    #[serde(default)]
    pub cached: bool,
}

impl ChatResponse {
    /// Whitespace-only replies count as blank and are never cached.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
