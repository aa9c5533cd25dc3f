//! Fake AI client for testing.
//!
//! Returns deterministic responses based on prompt matching, so generator
//! tests run without network access or API costs.

use async_trait::async_trait;
use std::sync::RwLock;

use super::client::{AiClient, AiError};
use super::image_client::ImageClient;
use super::types::{ChatRequest, ChatResponse, Usage};

/// A fake AI client for testing.
///
/// Responses are matched by checking if the prompt contains a registered
/// substring (case-insensitive). The first registered match wins.
#[derive(Debug, Default)]
pub struct FakeAiClient {
    responses: Vec<(String, String)>,
    default_response: Option<String>,
    image_url: Option<String>,
    completions: RwLock<Vec<String>>,
    invalidations: RwLock<Vec<String>>,
    image_prompts: RwLock<Vec<String>>,
}

impl FakeAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to prompts containing `prompt_contains`.
    pub fn with_response(mut self, prompt_contains: &str, response: &str) -> Self {
        self.responses
            .push((prompt_contains.to_lowercase(), response.to_string()));
        self
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// URL returned by every image generation.
    pub fn with_image_url(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }

    /// Prompt names of completed requests, in order.
    pub fn completions(&self) -> Vec<String> {
        self.completions.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Prompt names of invalidated requests, in order.
    pub fn invalidations(&self) -> Vec<String> {
        self.invalidations
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Prompts sent to image generation, in order.
    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn record(log: &RwLock<Vec<String>>, entry: &str) {
        if let Ok(mut log) = log.write() {
            log.push(entry.to_string());
        }
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        _prompt_version: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        Self::record(&self.completions, prompt_name);

        let prompt_lower = request.prompt.to_lowercase();
        let content = self
            .responses
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .or_else(|| self.default_response.clone())
            .ok_or_else(|| {
                AiError::Api(format!(
                    "FakeAiClient: No response configured for prompt {}",
                    prompt_name
                ))
            })?;

        Ok(ChatResponse {
            content,
            usage: Usage::default(),
            cached: false,
        })
    }

    async fn invalidate(
        &self,
        prompt_name: &str,
        _prompt_version: &str,
        _request: &ChatRequest,
    ) -> Result<bool, AiError> {
        Self::record(&self.invalidations, prompt_name);
        Ok(true)
    }
}

#[async_trait]
impl ImageClient for FakeAiClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, AiError> {
        Self::record(&self.image_prompts, prompt);
        self.image_url
            .clone()
            .ok_or_else(|| AiError::Api("FakeAiClient: No image URL configured".to_string()))
    }
}
