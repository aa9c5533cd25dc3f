//! Generation service abstraction.
//!
//! The orchestrator talks to the content-generation service only through
//! [`RecipeGenerator`]. [`AiRecipeGenerator`] is the production implementation
//! on top of the AI clients; [`FakeGenerator`] is deterministic and records
//! every call for tests and offline runs.

mod ai;
mod fake;

pub use ai::AiRecipeGenerator;
pub use fake::{FakeGenerator, GeneratorCall};

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::AiError;
use crate::types::{MealType, RecipeBody};

/// Error type for generation service calls.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Generation service unavailable: {0}")]
    Unavailable(String),
}

/// The external content-generation service.
///
/// An empty string or `None` result is not an error at this level; the
/// orchestrator decides what an empty result means for the attempt.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn title(&self, ingredients: &[String], meal_type: MealType) -> Result<String, GeneratorError>;

    /// Returns a transient image URL. The title is the only content input.
    async fn image(&self, title: &str) -> Result<String, GeneratorError>;

    async fn description(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<String, GeneratorError>;

    async fn body(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<Option<RecipeBody>, GeneratorError>;

    /// Invalidate cached results for these inputs, so the next attempt with
    /// them reaches the service. Entries for other inputs stay cached.
    async fn flush_cache(&self, ingredients: &[String], meal_type: MealType) -> Result<(), GeneratorError>;

    /// Get the generator name (e.g., "ai", "fake").
    fn name(&self) -> &'static str;
}
