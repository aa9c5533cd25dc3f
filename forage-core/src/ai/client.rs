//! AI client implementation using OpenRouter (OpenAI-compatible API).

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::cache::{AiCache, CacheKey};
use super::config::AiConfig;
use super::types::{ChatRequest, ChatResponse, Usage};

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("API returned error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Response not in cache and offline mode is enabled")]
    OfflineNotCached,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Trait for AI clients.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Complete a chat request.
    ///
    /// `prompt_name` and `prompt_version` organize the cache; the entry itself
    /// is keyed by the content hash of the prompt text.
    async fn complete(
        &self,
        prompt_name: &str,
        prompt_version: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError>;

    /// Drop any cached response for exactly this request.
    ///
    /// Returns whether an entry was removed.
    async fn invalidate(
        &self,
        prompt_name: &str,
        prompt_version: &str,
        request: &ChatRequest,
    ) -> Result<bool, AiError>;
}

/// AI client with caching and rate limiting, using OpenRouter.
pub struct CachingAiClient {
    client: Client<OpenAIConfig>,
    cache: AiCache,
    config: AiConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl CachingAiClient {
    /// Create a new client from environment configuration.
    pub fn from_env() -> Result<Self, AiError> {
        let config = AiConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Create a new client with the given configuration.
    pub fn new(config: AiConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        let client = Client::with_config(openai_config);
        let cache = AiCache::new(config.cache_dir.clone());

        Self {
            client,
            cache,
            config,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn cache(&self) -> &AiCache {
        &self.cache
    }

    /// Apply rate limiting between requests.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            let min_interval = Duration::from_millis(self.config.rate_limit_ms);

            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    fn cache_key(&self, prompt_name: &str, prompt_version: &str, request: &ChatRequest) -> CacheKey {
        CacheKey::new(prompt_name, prompt_version, &self.config.model, &request.prompt)
    }
}

#[async_trait]
impl AiClient for CachingAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        prompt_version: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let cache_key = self.cache_key(prompt_name, prompt_version, &request);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(prompt_name, "AI response found in cache");
            return Ok(cached.into());
        }

        if self.config.offline {
            return Err(AiError::OfflineNotCached);
        }

        self.rate_limit().await;

        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.clone())
            .build()
            .map(Into::into)
            .map_err(|e| AiError::Api(format!("Failed to build user message: {}", e)))?;

        let mut req_builder = CreateChatCompletionRequestArgs::default();
        req_builder.model(&self.config.model).messages(vec![message]);

        if let Some(max_tokens) = request.max_tokens {
            req_builder.max_completion_tokens(max_tokens);
        }

        if let Some(temperature) = request.temperature {
            req_builder.temperature(temperature);
        }

        if request.json_response {
            req_builder.response_format(ResponseFormat::JsonObject);
        }

        let openai_request = req_builder
            .build()
            .map_err(|e| AiError::Api(e.to_string()))?;

        tracing::debug!(prompt_name, model = &self.config.model, "Calling AI API");

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        let chat_response = ChatResponse {
            content,
            usage,
            cached: false,
        };

        // Empty replies are not cached: a regeneration must reach the service again
        if !chat_response.is_blank() {
            if let Err(e) = self
                .cache
                .put(&cache_key, &chat_response, &self.config.model)
            {
                tracing::warn!("Failed to cache AI response: {}", e);
            }
        }

        Ok(chat_response)
    }

    async fn invalidate(
        &self,
        prompt_name: &str,
        prompt_version: &str,
        request: &ChatRequest,
    ) -> Result<bool, AiError> {
        let cache_key = self.cache_key(prompt_name, prompt_version, request);
        let removed = self
            .cache
            .remove(&cache_key)
            .map_err(|e| AiError::Cache(e.to_string()))?;
        tracing::debug!(prompt_name, removed, "AI cache entry invalidated");
        Ok(removed)
    }
}
