//! Body prompt: the full structured recipe, returned as JSON.

use serde::Deserialize;

use super::meal_phrase;
use crate::types::{MealType, RecipeBody, RecipeSection};

/// Prompt name for cache keys.
pub const BODY_PROMPT_NAME: &str = "recipe_body";

pub const BODY_PROMPT_VERSION: &str = "v1";

/// Render the body prompt.
pub fn render_body_prompt(title: &str, ingredients: &[String], meal_type: MealType) -> String {
    format!(
        r#"You are a recipe writer. Write the full recipe for the {meal} dish "{title}" using: {ingredients}.
You may add common pantry staples.

Respond with JSON only, no other text, matching this shape:
{{"ingredients": ["2 eggs", "1 tbsp butter"], "sections": [{{"title": "Preparation", "steps": ["Whisk the eggs."]}}]}}"#,
        meal = meal_phrase(meal_type),
        title = title,
        ingredients = ingredients.join(", "),
    )
}

/// Response format from the AI.
#[derive(Debug, Deserialize)]
struct BodyResponse {
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    sections: Vec<SectionResponse>,
}

#[derive(Debug, Deserialize)]
struct SectionResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    steps: Vec<String>,
}

/// Parse the body reply.
///
/// Blank lines are dropped; sections left without steps are dropped. Returns
/// `Ok(None)` for an empty reply or one with no usable content.
pub fn parse_body_response(content: &str) -> Result<Option<RecipeBody>, serde_json::Error> {
    let trimmed = strip_code_fence(content.trim());
    if trimmed.is_empty() {
        return Ok(None);
    }

    let response: BodyResponse = serde_json::from_str(trimmed)?;

    let ingredients: Vec<String> = response
        .ingredients
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();

    let sections: Vec<RecipeSection> = response
        .sections
        .into_iter()
        .map(|s| RecipeSection {
            title: s.title.trim().to_string(),
            steps: s
                .steps
                .into_iter()
                .map(|step| step.trim().to_string())
                .filter(|step| !step.is_empty())
                .collect(),
        })
        .filter(|s| !s.steps.is_empty())
        .collect();

    let body = RecipeBody {
        ingredients,
        sections,
    };
    Ok((!body.is_empty()).then_some(body))
}

/// Models sometimes wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(s: &str) -> &str {
    s.strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(s)
}
