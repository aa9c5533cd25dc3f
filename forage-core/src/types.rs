use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Meal type constraint for a generation attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    /// Unconstrained
    #[default]
    Any,
}

impl MealType {
    pub const ALL: &'static [MealType] = &[
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Any => "any",
        }
    }

    /// Apply a press of the `pressed` meal type button.
    ///
    /// Pressing the active value turns it back off, which resets to `Any`.
    pub fn toggle(self, pressed: MealType) -> MealType {
        if self == pressed {
            MealType::Any
        } else {
            pressed
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown meal type: {0} (expected breakfast, lunch, dinner or any)")]
pub struct ParseMealTypeError(String);

impl FromStr for MealType {
    type Err = ParseMealTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| ParseMealTypeError(s.to_string()))
    }
}

/// Generation stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Title,
    Image,
    Description,
    Body,
}

impl GenerationStage {
    /// All stages in execution order
    pub const ALL: &'static [GenerationStage] = &[
        GenerationStage::Title,
        GenerationStage::Image,
        GenerationStage::Description,
        GenerationStage::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::Title => "title",
            GenerationStage::Image => "image",
            GenerationStage::Description => "description",
            GenerationStage::Body => "body",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence steps in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistStep {
    Create,
    Upload,
    Backfill,
}

impl PersistStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistStep::Create => "create",
            PersistStep::Upload => "upload",
            PersistStep::Backfill => "backfill",
        }
    }
}

impl fmt::Display for PersistStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One titled group of instructions, e.g. "Prepare the sauce".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSection {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

/// Structured recipe content produced by the body stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeBody {
    /// Ingredient lines with quantities
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub sections: Vec<RecipeSection>,
}

impl RecipeBody {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.sections.iter().all(|s| s.steps.is_empty())
    }

    pub fn step_count(&self) -> usize {
        self.sections.iter().map(|s| s.steps.len()).sum()
    }
}

/// In-progress generation result.
///
/// Empty strings and a missing body mean "not generated yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub body: Option<RecipeBody>,
}

impl RecipeDraft {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.image_url.is_empty()
            && self.description.is_empty()
            && self.body.is_none()
    }

    pub fn is_complete(&self) -> bool {
        !self.title.is_empty()
            && !self.image_url.is_empty()
            && !self.description.is_empty()
            && self.body.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Freeze the draft if every field is populated.
    pub fn complete(&self) -> Option<CompleteDraft> {
        if !self.is_complete() {
            return None;
        }
        let body = self.body.clone()?;
        Some(CompleteDraft {
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            description: self.description.clone(),
            body,
        })
    }
}

/// A draft with all four fields populated. Only this type can be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteDraft {
    title: String,
    image_url: String,
    description: String,
    body: RecipeBody,
}

impl CompleteDraft {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn body(&self) -> &RecipeBody {
        &self.body
    }

    pub fn to_draft(&self) -> RecipeDraft {
        self.clone().into_draft()
    }

    pub fn into_draft(self) -> RecipeDraft {
        RecipeDraft {
            title: self.title,
            image_url: self.image_url,
            description: self.description,
            body: Some(self.body),
        }
    }
}

/// Fields of a recipe record before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    /// Ingredient names flattened into one comma-separated string
    pub ingredients: String,
    pub title: String,
    pub description: String,
    pub body: RecipeBody,
    pub meal_type: MealType,
    /// Transient URL returned by the image stage
    pub image_url: String,
}

impl NewRecipe {
    pub fn from_draft(
        draft: &CompleteDraft,
        ingredient_names: &[String],
        meal_type: MealType,
    ) -> Self {
        Self {
            ingredients: ingredient_names.join(","),
            title: draft.title().to_string(),
            description: draft.description().to_string(),
            body: draft.body().clone(),
            meal_type,
            image_url: draft.image_url().to_string(),
        }
    }
}

/// Where a persisted recipe's image lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum ImageRef {
    /// Short-lived URL from the generation service
    Transient(String),
    /// Reference into durable blob storage
    Durable(String),
}

impl ImageRef {
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Transient(url) | ImageRef::Durable(url) => url,
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, ImageRef::Durable(_))
    }
}

/// Who wrote a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ownership {
    /// Written with an identity token; `fingerprint` identifies the token holder.
    User { fingerprint: String },
    Anonymous,
}

impl Ownership {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Ownership::Anonymous)
    }
}

/// A recipe record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecipe {
    pub recipe_id: Uuid,
    pub ingredients: String,
    pub title: String,
    pub description: String,
    pub body: RecipeBody,
    pub meal_type: MealType,
    pub image_ref: ImageRef,
    pub owner: Ownership,
    pub created_at: DateTime<Utc>,
}
