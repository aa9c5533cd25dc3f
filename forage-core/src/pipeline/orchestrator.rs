//! Sequential generation of a recipe draft.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info_span, Instrument};

use crate::catalog::IngredientCatalog;
use crate::error::GenerationError;
use crate::generator::{GeneratorError, RecipeGenerator};
use crate::session::{GenerationInputs, Session};
use crate::types::{CompleteDraft, GenerationStage};

/// How long one stage took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub stage: GenerationStage,
    pub duration_ms: u64,
}

/// A complete draft plus the time spent in each stage.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub draft: CompleteDraft,
    pub timings: Vec<StageTiming>,
}

impl GenerationReport {
    pub fn total_ms(&self) -> u64 {
        self.timings.iter().map(|t| t.duration_ms).sum()
    }
}

/// Drives the generation service through title, image, description and body.
///
/// Each stage depends on the title, so nothing runs in parallel and the first
/// failure ends the attempt. A failed attempt leaves the session's draft
/// empty; there are no retries.
pub struct Orchestrator {
    generator: Arc<dyn RecipeGenerator>,
    catalog: Arc<IngredientCatalog>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn RecipeGenerator>, catalog: Arc<IngredientCatalog>) -> Self {
        Self { generator, catalog }
    }

    /// Generate a complete draft for the session's selection and meal type.
    ///
    /// Never persists. On success the session holds the draft and is marked
    /// unsynced.
    pub async fn generate(&self, session: &mut Session) -> Result<CompleteDraft, GenerationError> {
        self.generate_with_report(session)
            .await
            .map(|report| report.draft)
    }

    /// Like [`generate`](Self::generate), also returning per-stage timings.
    pub async fn generate_with_report(
        &self,
        session: &mut Session,
    ) -> Result<GenerationReport, GenerationError> {
        session.reset();

        let mut timings = Vec::with_capacity(GenerationStage::ALL.len());
        match self.run_stages(session, &mut timings).await {
            Ok((draft, inputs)) => {
                session.mark_unsynced(inputs);
                let report = GenerationReport { draft, timings };
                tracing::info!(
                    title = %report.draft.title(),
                    generator = self.generator.name(),
                    duration_ms = report.total_ms(),
                    "Recipe generated"
                );
                Ok(report)
            }
            Err(e) => {
                session.reset();
                tracing::warn!(stage = ?e.stage(), error = %e, "Recipe generation failed");
                Err(e)
            }
        }
    }

    /// Clear the session, flush the generator's cache for the session's
    /// inputs, and generate again.
    ///
    /// Only this session's inputs are flushed. The flush has no failure
    /// signal of its own; an error from it is logged and generation proceeds.
    pub async fn regenerate(&self, session: &mut Session) -> Result<CompleteDraft, GenerationError> {
        session.reset();

        // Invalid selections are reported by `generate` below
        if let Ok(inputs) = self.inputs(session) {
            if let Err(e) = self
                .generator
                .flush_cache(&inputs.ingredients, inputs.meal_type)
                .instrument(info_span!("flush_cache", generator = self.generator.name()))
                .await
            {
                tracing::warn!(error = %e, "Cache flush failed, regenerating anyway");
            }
        }

        self.generate(session).await
    }

    /// Resolve the session's selection into generator inputs.
    fn inputs(&self, session: &Session) -> Result<GenerationInputs, GenerationError> {
        if session.selection.is_empty() {
            return Err(GenerationError::EmptySelection);
        }
        Ok(GenerationInputs {
            ingredients: self.catalog.resolve(&session.selection)?,
            meal_type: session.meal_type,
        })
    }

    async fn run_stages(
        &self,
        session: &mut Session,
        timings: &mut Vec<StageTiming>,
    ) -> Result<(CompleteDraft, GenerationInputs), GenerationError> {
        let inputs = self.inputs(session)?;
        let ingredients = inputs.ingredients.as_slice();
        let meal_type = inputs.meal_type;
        let generator = self.generator.as_ref();

        let title = self
            .stage(GenerationStage::Title, timings, generator.title(ingredients, meal_type))
            .await?;
        let title = non_empty(GenerationStage::Title, &title)?;
        session.draft.title = title.clone();

        let image_url = self
            .stage(GenerationStage::Image, timings, generator.image(&title))
            .await?;
        session.draft.image_url = non_empty(GenerationStage::Image, &image_url)?;

        let description = self
            .stage(
                GenerationStage::Description,
                timings,
                generator.description(&title, ingredients, meal_type),
            )
            .await?;
        session.draft.description = non_empty(GenerationStage::Description, &description)?;

        let body = self
            .stage(
                GenerationStage::Body,
                timings,
                generator.body(&title, ingredients, meal_type),
            )
            .await?
            .filter(|body| !body.is_empty())
            .ok_or_else(|| GenerationError::empty(GenerationStage::Body))?;
        session.draft.body = Some(body);

        let draft = session
            .draft
            .complete()
            .ok_or_else(|| GenerationError::empty(GenerationStage::Body))?;
        Ok((draft, inputs))
    }

    /// Run one stage call inside its span and record how long it took.
    async fn stage<T, F>(
        &self,
        stage: GenerationStage,
        timings: &mut Vec<StageTiming>,
        call: F,
    ) -> Result<T, GenerationError>
    where
        F: Future<Output = Result<T, GeneratorError>>,
    {
        let start = Instant::now();
        let result = call
            .instrument(info_span!(
                "generation_stage",
                stage = %stage,
                generator = self.generator.name()
            ))
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;
        timings.push(StageTiming { stage, duration_ms });

        match result {
            Ok(value) => {
                tracing::debug!(stage = %stage, duration_ms, "Stage complete");
                Ok(value)
            }
            Err(e) => Err(GenerationError::service(stage, e.to_string())),
        }
    }
}

fn non_empty(stage: GenerationStage, value: &str) -> Result<String, GenerationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::empty(stage));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageFailure;
    use crate::generator::{FakeGenerator, GeneratorCall};
    use crate::session::IngredientSelection;
    use crate::types::MealType;

    fn orchestrator(generator: FakeGenerator) -> (Arc<FakeGenerator>, Orchestrator) {
        let generator = Arc::new(generator);
        let orchestrator = Orchestrator::new(generator.clone(), IngredientCatalog::builtin());
        (generator, orchestrator)
    }

    fn session(ids: &[u32]) -> Session {
        Session::new(ids.iter().copied().collect::<IngredientSelection>(), MealType::Breakfast)
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(GenerationStage::Title, "  Hash \n").unwrap(), "Hash");
        assert_eq!(
            non_empty(GenerationStage::Title, " \t "),
            Err(GenerationError::empty(GenerationStage::Title))
        );
    }

    #[tokio::test]
    async fn test_report_has_timing_per_stage() {
        let (_, orchestrator) = orchestrator(FakeGenerator::new());
        let mut session = session(&[1840, 2015]);
        let report = orchestrator.generate_with_report(&mut session).await.unwrap();

        let stages: Vec<_> = report.timings.iter().map(|t| t.stage).collect();
        assert_eq!(stages, GenerationStage::ALL.to_vec());
        assert_eq!(
            report.total_ms(),
            report.timings.iter().map(|t| t.duration_ms).sum::<u64>()
        );
        assert_eq!(session.draft(), &report.draft.to_draft());
        assert_eq!(
            session.generated_from(),
            Some(&GenerationInputs {
                ingredients: vec!["CHICKEN BREAST".to_string(), "EGGS".to_string()],
                meal_type: MealType::Breakfast,
            })
        );
    }

    #[tokio::test]
    async fn test_empty_selection_calls_nothing() {
        let (generator, orchestrator) = orchestrator(FakeGenerator::new());
        let mut session = session(&[]);
        assert_eq!(
            orchestrator.generate(&mut session).await,
            Err(GenerationError::EmptySelection)
        );
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ingredient_calls_nothing() {
        let (generator, orchestrator) = orchestrator(FakeGenerator::new());
        let mut session = session(&[999_999]);
        assert!(matches!(
            orchestrator.generate(&mut session).await,
            Err(GenerationError::Catalog(_))
        ));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_is_reported_with_stage() {
        let (_, orchestrator) =
            orchestrator(FakeGenerator::new().with_error(GenerationStage::Description, "quota"));
        let mut session = session(&[2015]);
        let err = orchestrator.generate(&mut session).await.unwrap_err();
        assert_eq!(err.stage(), Some(GenerationStage::Description));
        assert!(matches!(
            err,
            GenerationError::Stage {
                reason: StageFailure::Service(_),
                ..
            }
        ));
        assert!(!session.has_draft());
    }

    #[tokio::test]
    async fn test_previous_draft_cleared_on_new_attempt() {
        let (generator, orchestrator) = orchestrator(FakeGenerator::new());
        let mut session = session(&[2015]);
        orchestrator.generate(&mut session).await.unwrap();
        assert!(session.has_draft());

        generator.fail_empty(GenerationStage::Title);
        assert!(orchestrator.generate(&mut session).await.is_err());
        assert!(!session.has_draft());
        assert!(!session.has_unsynced_result());
    }

    #[tokio::test]
    async fn test_regenerate_flushes_only_session_inputs() {
        let (generator, orchestrator) = orchestrator(FakeGenerator::new());
        let mut session = session(&[2015]);
        orchestrator.regenerate(&mut session).await.unwrap();

        assert_eq!(
            generator.calls()[0],
            GeneratorCall::FlushCache {
                ingredients: vec!["EGGS".to_string()],
                meal_type: MealType::Breakfast,
            }
        );
    }

    #[tokio::test]
    async fn test_regenerate_invalid_selection_skips_flush() {
        let (generator, orchestrator) = orchestrator(FakeGenerator::new());
        let mut session = session(&[999_999]);
        assert!(orchestrator.regenerate(&mut session).await.is_err());
        assert_eq!(generator.flush_count(), 0);
    }
}
