//! Title prompt: names a dish built from the selected ingredients.

use super::meal_phrase;
use crate::types::MealType;

/// Prompt name for cache keys.
pub const TITLE_PROMPT_NAME: &str = "recipe_title";

/// Bump when the template changes so stale cache entries are not reused.
pub const TITLE_PROMPT_VERSION: &str = "v1";

/// Render the title prompt.
pub fn render_title_prompt(ingredients: &[String], meal_type: MealType) -> String {
    format!(
        r#"You are a creative chef. Invent one recipe for {meal} that uses these ingredients: {ingredients}.

Respond with the recipe title only: no quotes, no numbering, no other text."#,
        meal = meal_phrase(meal_type),
        ingredients = ingredients.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let prompt = render_title_prompt(
            &["CHICKEN BREAST".to_string(), "EGGS".to_string()],
            MealType::Breakfast,
        );
        assert!(prompt.contains("CHICKEN BREAST, EGGS"));
        assert!(prompt.contains("for breakfast"));
    }

    #[test]
    fn test_any_meal() {
        let prompt = render_title_prompt(&["RICE".to_string()], MealType::Any);
        assert!(prompt.contains("any meal of the day"));
    }
}
