//! AI configuration from environment variables.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default OpenRouter base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "openai/dall-e-3";

/// Default rate limit between requests in milliseconds.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// AI client configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for OpenRouter.
    pub api_key: String,
    /// Chat model used for title, description and body.
    pub model: String,
    /// Model used for the recipe image.
    pub image_model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Directory for caching responses.
    pub cache_dir: PathBuf,
    /// If true, only use cache, error if not cached.
    pub offline: bool,
    /// Milliseconds to wait between requests.
    pub rate_limit_ms: u64,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENROUTER_API_KEY`: API key for OpenRouter
    ///
    /// Optional:
    /// - `FORAGE_AI_MODEL`: Chat model (default: "openai/gpt-4o-mini")
    /// - `FORAGE_AI_IMAGE_MODEL`: Image model (default: "openai/dall-e-3")
    /// - `FORAGE_AI_BASE_URL`: API base URL (default: "https://openrouter.ai/api/v1")
    /// - `FORAGE_AI_CACHE_DIR`: Cache directory (default: "~/.forage/ai-cache")
    /// - `FORAGE_AI_OFFLINE`: Use cache only (default: false)
    /// - `FORAGE_AI_RATE_LIMIT_MS`: Rate limit in ms (default: 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let model = env::var("FORAGE_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let image_model =
            env::var("FORAGE_AI_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string());

        let base_url =
            env::var("FORAGE_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let offline = env::var("FORAGE_AI_OFFLINE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let rate_limit_ms = env::var("FORAGE_AI_RATE_LIMIT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MS);

        Ok(Self {
            api_key,
            model,
            image_model,
            base_url,
            cache_dir: Self::cache_dir_from_env(),
            offline,
            rate_limit_ms,
        })
    }

    /// `FORAGE_AI_CACHE_DIR`, or the default cache directory.
    ///
    /// Needs no API key, so cache maintenance works without credentials.
    pub fn cache_dir_from_env() -> PathBuf {
        env::var("FORAGE_AI_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_cache_dir())
    }

    /// Get the default cache directory: ~/.forage/ai-cache
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".forage").join("ai-cache"))
            .unwrap_or_else(|| PathBuf::from("data/ai-cache"))
    }
}
