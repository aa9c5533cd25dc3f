//! AI prompt templates, one module per generation stage.

pub mod body;
pub mod description;
pub mod image;
pub mod title;

pub use body::render_body_prompt;
pub use description::render_description_prompt;
pub use image::render_image_prompt;
pub use title::render_title_prompt;

use crate::types::MealType;

/// Human phrasing of the meal type for prompts.
pub(crate) fn meal_phrase(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "breakfast",
        MealType::Lunch => "lunch",
        MealType::Dinner => "dinner",
        MealType::Any => "any meal of the day",
    }
}
