//! Fake generator for tests and offline runs.
//!
//! Produces deterministic output derived from its inputs, records every call
//! in order, and can be told to fail at a given stage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{GeneratorError, RecipeGenerator};
use crate::types::{GenerationStage, MealType, RecipeBody, RecipeSection};

/// One call received by [`FakeGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorCall {
    Title {
        ingredients: Vec<String>,
        meal_type: MealType,
    },
    Image {
        title: String,
    },
    Description {
        title: String,
        ingredients: Vec<String>,
        meal_type: MealType,
    },
    Body {
        title: String,
        ingredients: Vec<String>,
        meal_type: MealType,
    },
    FlushCache {
        ingredients: Vec<String>,
        meal_type: MealType,
    },
}

impl GeneratorCall {
    pub fn stage(&self) -> Option<GenerationStage> {
        match self {
            GeneratorCall::Title { .. } => Some(GenerationStage::Title),
            GeneratorCall::Image { .. } => Some(GenerationStage::Image),
            GeneratorCall::Description { .. } => Some(GenerationStage::Description),
            GeneratorCall::Body { .. } => Some(GenerationStage::Body),
            GeneratorCall::FlushCache { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Failure {
    Empty,
    Error(String),
}

/// A deterministic generator.
///
/// Same inputs give the same output until `flush_cache` is called for them,
/// after which their titles carry a new revision number, like a fresh service
/// response.
#[derive(Debug, Default)]
pub struct FakeGenerator {
    calls: RwLock<Vec<GeneratorCall>>,
    failure: RwLock<Option<(GenerationStage, Failure)>>,
    revisions: RwLock<HashMap<(Vec<String>, MealType), u32>>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an empty result at `stage`.
    pub fn with_empty(self, stage: GenerationStage) -> Self {
        self.set_failure(stage, Failure::Empty);
        self
    }

    /// Return a service error at `stage`.
    pub fn with_error(self, stage: GenerationStage, message: &str) -> Self {
        self.set_failure(stage, Failure::Error(message.to_string()));
        self
    }

    /// Make `stage` return an empty result from now on.
    pub fn fail_empty(&self, stage: GenerationStage) {
        self.set_failure(stage, Failure::Empty);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&self) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = None;
        }
    }

    /// All calls received, in order.
    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Stages invoked, in order (cache flushes excluded).
    pub fn stages_called(&self) -> Vec<GenerationStage> {
        self.calls()
            .iter()
            .filter_map(GeneratorCall::stage)
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GeneratorCall::FlushCache { .. }))
            .count()
    }

    fn set_failure(&self, stage: GenerationStage, kind: Failure) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some((stage, kind));
        }
    }

    fn record(&self, call: GeneratorCall) {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(call);
        }
    }

    fn revision(&self, ingredients: &[String], meal_type: MealType) -> u32 {
        self.revisions
            .read()
            .ok()
            .and_then(|r| r.get(&(ingredients.to_vec(), meal_type)).copied())
            .unwrap_or(0)
    }

    /// `Some(result)` when a failure is injected for `stage`.
    fn injected<T: Default>(&self, stage: GenerationStage) -> Option<Result<T, GeneratorError>> {
        let failure = self.failure.read().ok()?.clone()?;
        if failure.0 != stage {
            return None;
        }
        Some(match failure.1 {
            Failure::Empty => Ok(T::default()),
            Failure::Error(message) => Err(GeneratorError::Unavailable(message)),
        })
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn slug(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

#[async_trait]
impl RecipeGenerator for FakeGenerator {
    async fn title(&self, ingredients: &[String], meal_type: MealType) -> Result<String, GeneratorError> {
        self.record(GeneratorCall::Title {
            ingredients: ingredients.to_vec(),
            meal_type,
        });
        if let Some(result) = self.injected(GenerationStage::Title) {
            return result;
        }

        let names: Vec<String> = ingredients.iter().map(|i| title_case(i)).collect();
        let mut title = format!("{} {}", names.join(" and "), title_case(meal_type.as_str()));
        let revision = self.revision(ingredients, meal_type);
        if revision > 0 {
            title.push_str(&format!(" No. {}", revision + 1));
        }
        Ok(title)
    }

    async fn image(&self, title: &str) -> Result<String, GeneratorError> {
        self.record(GeneratorCall::Image {
            title: title.to_string(),
        });
        if let Some(result) = self.injected(GenerationStage::Image) {
            return result;
        }
        Ok(format!("https://images.fake/{}.png", slug(title)))
    }

    async fn description(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<String, GeneratorError> {
        self.record(GeneratorCall::Description {
            title: title.to_string(),
            ingredients: ingredients.to_vec(),
            meal_type,
        });
        if let Some(result) = self.injected(GenerationStage::Description) {
            return result;
        }
        Ok(format!(
            "{} brings together {} in one easy dish.",
            title,
            ingredients.join(", ").to_lowercase()
        ))
    }

    async fn body(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<Option<RecipeBody>, GeneratorError> {
        self.record(GeneratorCall::Body {
            title: title.to_string(),
            ingredients: ingredients.to_vec(),
            meal_type,
        });
        if let Some(result) = self.injected(GenerationStage::Body) {
            return result;
        }
        Ok(Some(RecipeBody {
            ingredients: ingredients.iter().map(|i| format!("1 portion {}", i.to_lowercase())).collect(),
            sections: vec![RecipeSection {
                title: "Method".to_string(),
                steps: vec![
                    format!("Prepare the {}.", ingredients.join(" and ").to_lowercase()),
                    format!("Cook and serve the {}.", title),
                ],
            }],
        }))
    }

    async fn flush_cache(&self, ingredients: &[String], meal_type: MealType) -> Result<(), GeneratorError> {
        self.record(GeneratorCall::FlushCache {
            ingredients: ingredients.to_vec(),
            meal_type,
        });
        if let Ok(mut revisions) = self.revisions.write() {
            *revisions.entry((ingredients.to_vec(), meal_type)).or_default() += 1;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
