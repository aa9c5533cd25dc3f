//! Image generation through an OpenAI-compatible `/images/generations` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::AiError;
use super::config::AiConfig;

/// Trait for image generation backends.
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Generate one image and return its (transient) URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, AiError>;
}

/// Image generation over HTTP. Responses are never cached: the returned URLs
/// expire, so a cached URL would be useless on the next run.
#[derive(Debug)]
pub struct HttpImageClient {
    api_key: String,
    model: String,
    base_url: String,
    size: String,
    offline: bool,
    client: reqwest::Client,
}

impl HttpImageClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.image_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            size: "1024x1024".to_string(),
            offline: config.offline,
            client: reqwest::Client::new(),
        }
    }

    /// Override the requested image size (e.g. "512x512").
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }
}

/// Image API request format.
#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

/// Image API response format.
#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Error response from the image API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

/// Pull the first image URL out of a successful response body.
///
/// A response without any URL yields an empty string; the caller treats that
/// as an empty generation result.
fn parse_image_url(body: &str) -> Result<String, AiError> {
    let response: ImageResponse =
        serde_json::from_str(body).map_err(|e| AiError::ParseError(e.to_string()))?;
    Ok(response
        .data
        .into_iter()
        .find_map(|d| d.url)
        .unwrap_or_default())
}

#[async_trait]
impl ImageClient for HttpImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, AiError> {
        if self.offline {
            return Err(AiError::OfflineNotCached);
        }

        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        tracing::debug!(model = %self.model, "Calling image API");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(AiError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        if status != 200 {
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(AiError::Status {
                    status,
                    message: error_response.error.message,
                });
            }
            return Err(AiError::Status {
                status,
                message: body,
            });
        }

        parse_image_url(&body)
    }
}
