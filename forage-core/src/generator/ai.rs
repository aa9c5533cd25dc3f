//! Generation service backed by the AI chat and image clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{GeneratorError, RecipeGenerator};
use crate::ai::prompts::body::{parse_body_response, BODY_PROMPT_NAME, BODY_PROMPT_VERSION};
use crate::ai::prompts::description::{DESCRIPTION_PROMPT_NAME, DESCRIPTION_PROMPT_VERSION};
use crate::ai::prompts::title::{TITLE_PROMPT_NAME, TITLE_PROMPT_VERSION};
use crate::ai::prompts::{
    render_body_prompt, render_description_prompt, render_image_prompt, render_title_prompt,
};
use crate::ai::{AiClient, ChatRequest, ImageClient};
use crate::types::{MealType, RecipeBody};

/// Ingredient names and meal type of one generation attempt.
type Inputs = (Vec<String>, MealType);

/// A chat request as it was sent for one prompt.
#[derive(Debug, Clone, PartialEq)]
struct IssuedRequest {
    prompt_name: &'static str,
    version: &'static str,
    request: ChatRequest,
}

/// Production generator: chat completions for text, image API for the photo.
///
/// The title request is a pure function of the inputs. Description and body
/// requests also depend on the title, so they are remembered per inputs and
/// `flush_cache` invalidates exactly the entries a regeneration with those
/// inputs would otherwise hit.
pub struct AiRecipeGenerator {
    chat: Arc<dyn AiClient>,
    images: Arc<dyn ImageClient>,
    issued: Mutex<HashMap<Inputs, Vec<IssuedRequest>>>,
}

impl AiRecipeGenerator {
    pub fn new(chat: Arc<dyn AiClient>, images: Arc<dyn ImageClient>) -> Self {
        Self {
            chat,
            images,
            issued: Mutex::new(HashMap::new()),
        }
    }

    async fn complete(&self, inputs: Inputs, issued: IssuedRequest) -> Result<String, GeneratorError> {
        let prompt_name = issued.prompt_name;
        let (version, request) = (issued.version, issued.request.clone());
        if let Ok(mut log) = self.issued.lock() {
            let requests = log.entry(inputs).or_default();
            if !requests.contains(&issued) {
                requests.push(issued);
            }
        }

        let response = self.chat.complete(prompt_name, version, request).await?;
        tracing::debug!(
            prompt_name,
            cached = response.cached,
            tokens = response.usage.total_tokens,
            "Generation response received"
        );
        Ok(response.content)
    }
}

fn title_request(ingredients: &[String], meal_type: MealType) -> IssuedRequest {
    IssuedRequest {
        prompt_name: TITLE_PROMPT_NAME,
        version: TITLE_PROMPT_VERSION,
        request: ChatRequest::new(render_title_prompt(ingredients, meal_type))
            .max_tokens(64)
            .temperature(0.9),
    }
}

fn description_request(title: &str, ingredients: &[String], meal_type: MealType) -> IssuedRequest {
    IssuedRequest {
        prompt_name: DESCRIPTION_PROMPT_NAME,
        version: DESCRIPTION_PROMPT_VERSION,
        request: ChatRequest::new(render_description_prompt(title, ingredients, meal_type))
            .max_tokens(200)
            .temperature(0.7),
    }
}

fn body_request(title: &str, ingredients: &[String], meal_type: MealType) -> IssuedRequest {
    IssuedRequest {
        prompt_name: BODY_PROMPT_NAME,
        version: BODY_PROMPT_VERSION,
        request: ChatRequest::new(render_body_prompt(title, ingredients, meal_type))
            .max_tokens(1500)
            .temperature(0.7)
            .json(),
    }
}

/// Strip whitespace and wrapping quotes a model may add around a title.
fn clean_title(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim()
        .to_string()
}

#[async_trait]
impl RecipeGenerator for AiRecipeGenerator {
    async fn title(&self, ingredients: &[String], meal_type: MealType) -> Result<String, GeneratorError> {
        let content = self
            .complete(
                (ingredients.to_vec(), meal_type),
                title_request(ingredients, meal_type),
            )
            .await?;
        Ok(clean_title(&content))
    }

    async fn image(&self, title: &str) -> Result<String, GeneratorError> {
        let url = self
            .images
            .generate_image(&render_image_prompt(title))
            .await?;
        Ok(url.trim().to_string())
    }

    async fn description(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<String, GeneratorError> {
        let content = self
            .complete(
                (ingredients.to_vec(), meal_type),
                description_request(title, ingredients, meal_type),
            )
            .await?;
        Ok(content.trim().to_string())
    }

    async fn body(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<Option<RecipeBody>, GeneratorError> {
        let content = self
            .complete(
                (ingredients.to_vec(), meal_type),
                body_request(title, ingredients, meal_type),
            )
            .await?;
        parse_body_response(&content)
            .map_err(|e| GeneratorError::ParseError(format!("Failed to parse recipe body: {}", e)))
    }

    async fn flush_cache(&self, ingredients: &[String], meal_type: MealType) -> Result<(), GeneratorError> {
        let inputs = (ingredients.to_vec(), meal_type);
        let mut targets = vec![title_request(ingredients, meal_type)];
        if let Ok(mut log) = self.issued.lock() {
            for issued in log.remove(&inputs).unwrap_or_default() {
                if !targets.contains(&issued) {
                    targets.push(issued);
                }
            }
        }

        let mut last_error = None;
        for target in targets {
            if let Err(e) = self
                .chat
                .invalidate(target.prompt_name, target.version, &target.request)
                .await
            {
                tracing::warn!(
                    prompt_name = target.prompt_name,
                    error = %e,
                    "Failed to invalidate cached response"
                );
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "ai"
    }
}
