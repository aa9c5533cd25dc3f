//! AI client module for LLM integration via OpenRouter.
//!
//! This module provides:
//! - `AiClient` trait for abstracting chat providers
//! - `CachingAiClient` implementation with disk-based caching
//! - `ImageClient` trait and `HttpImageClient` for recipe photos
//! - Configuration via environment variables
//! - Prompt templates for each generation stage
//!
//! # Configuration
//!
//! Set these environment variables:
//!
//! - `OPENROUTER_API_KEY` (required): Your OpenRouter API key
//! - `FORAGE_AI_MODEL` (optional): Chat model name, e.g., "openai/gpt-4o-mini"
//! - `FORAGE_AI_IMAGE_MODEL` (optional): Image model name
//! - `FORAGE_AI_BASE_URL` (optional): API base URL
//! - `FORAGE_AI_CACHE_DIR` (optional): Cache directory path
//! - `FORAGE_AI_OFFLINE` (optional): Set to "true" to use cache only
//! - `FORAGE_AI_RATE_LIMIT_MS` (optional): Delay between requests in ms
//!
//! # Example
//!
//! ```ignore
//! use forage_core::ai::{AiClient, CachingAiClient, ChatRequest};
//!
//! let client = CachingAiClient::from_env()?;
//! let request = ChatRequest::new("Invent a recipe with leeks.").max_tokens(64);
//!
//! let response = client.complete("recipe_title", "v1", request).await?;
//! println!("Response: {}", response.content);
//! ```

mod cache;
mod client;
mod config;
mod fake;
mod image_client;
pub mod prompts;
mod types;

pub use cache::{AiCache, CacheKey, CacheStats, CachedAiResponse};
pub use client::{AiClient, AiError, CachingAiClient};
pub use config::{AiConfig, ConfigError};
pub use fake::FakeAiClient;
pub use image_client::{HttpImageClient, ImageClient};
pub use types::{ChatRequest, ChatResponse, Usage};
