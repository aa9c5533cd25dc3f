//! Description prompt: a short teaser for an already titled recipe.

use super::meal_phrase;
use crate::types::MealType;

/// Prompt name for cache keys.
pub const DESCRIPTION_PROMPT_NAME: &str = "recipe_description";

pub const DESCRIPTION_PROMPT_VERSION: &str = "v1";

/// Render the description prompt.
pub fn render_description_prompt(title: &str, ingredients: &[String], meal_type: MealType) -> String {
    format!(
        r#"Write a one or two sentence description of the {meal} recipe "{title}", made with: {ingredients}.

Make it appetizing. Respond with the description only."#,
        meal = meal_phrase(meal_type),
        title = title,
        ingredients = ingredients.join(", "),
    )
}
