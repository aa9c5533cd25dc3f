//! End-to-end tests for generation and persistence.
//!
//! Everything runs against in-process backends: `FakeGenerator` for the
//! generation service, `MemoryRecipeStore`/`FileRecipeStore` for records and
//! `DiskBlobStorage<MockClient>` or `MemoryBlobStorage` for images.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use forage_core::{
    Anonymous, DiskBlobStorage, FakeGenerator, FileRecipeStore, GenerationError,
    GenerationStage, GeneratorCall, GeneratorError, ImageRef, IngredientCatalog,
    IngredientSelection, Kitchen, MealType, MemoryBlobStorage, MemoryRecipeStore, MockClient,
    Orchestrator, PersistStep, PersistenceGateway, RecipeBody, RecipeDraft, RecipeGenerator,
    RecipeStore, Session, StageFailure, StaticIdentity, StoreCall, SyncState,
};
use image::{DynamicImage, ImageFormat};
use tempfile::TempDir;

const CHICKEN_BREAST: u32 = 1840;
const EGGS: u32 = 2015;

fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(4, 4)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn session(ids: &[u32], meal_type: MealType) -> Session {
    Session::new(ids.iter().copied().collect(), meal_type)
}

fn orchestrator(generator: Arc<dyn RecipeGenerator>) -> Orchestrator {
    Orchestrator::new(generator, IngredientCatalog::builtin())
}

struct Harness {
    generator: Arc<FakeGenerator>,
    store: Arc<MemoryRecipeStore>,
    blobs: Arc<MemoryBlobStorage>,
    kitchen: Kitchen,
}

fn harness(generator: FakeGenerator, store: MemoryRecipeStore, blobs: MemoryBlobStorage) -> Harness {
    let generator = Arc::new(generator);
    let store = Arc::new(store);
    let blobs = Arc::new(blobs);
    let kitchen = Kitchen::new(
        orchestrator(generator.clone()),
        PersistenceGateway::new(store.clone(), blobs.clone()),
        Arc::new(StaticIdentity::new(Some("user-token".to_string()))),
    );
    Harness {
        generator,
        store,
        blobs,
        kitchen,
    }
}

/// Delegates to a `FakeGenerator` but always produces the same title and
/// records the arguments of every image request.
struct FixedTitle {
    inner: FakeGenerator,
    image_inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl RecipeGenerator for FixedTitle {
    async fn title(&self, _ingredients: &[String], _meal_type: MealType) -> Result<String, GeneratorError> {
        Ok("House Special".to_string())
    }

    async fn image(&self, title: &str) -> Result<String, GeneratorError> {
        self.image_inputs.lock().unwrap().push(title.to_string());
        self.inner.image(title).await
    }

    async fn description(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<String, GeneratorError> {
        self.inner.description(title, ingredients, meal_type).await
    }

    async fn body(
        &self,
        title: &str,
        ingredients: &[String],
        meal_type: MealType,
    ) -> Result<Option<RecipeBody>, GeneratorError> {
        self.inner.body(title, ingredients, meal_type).await
    }

    async fn flush_cache(&self, ingredients: &[String], meal_type: MealType) -> Result<(), GeneratorError> {
        self.inner.flush_cache(ingredients, meal_type).await
    }

    fn name(&self) -> &'static str {
        "fixed-title"
    }
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn generate_fills_all_fields_for_every_meal_type() {
    for meal_type in MealType::ALL {
        let generator = Arc::new(FakeGenerator::new());
        let orchestrator = orchestrator(generator.clone());
        let mut session = session(&[CHICKEN_BREAST, EGGS], *meal_type);

        let draft = orchestrator.generate(&mut session).await.unwrap();
        assert!(!draft.title().is_empty());
        assert!(!draft.image_url().is_empty());
        assert!(!draft.description().is_empty());
        assert!(!draft.body().is_empty());
        assert!(session.draft().is_complete());
        assert_eq!(generator.stages_called(), GenerationStage::ALL.to_vec());
    }
}

#[tokio::test]
async fn generate_stops_at_first_empty_stage() {
    for (index, stage) in GenerationStage::ALL.iter().enumerate() {
        let generator = Arc::new(FakeGenerator::new().with_empty(*stage));
        let orchestrator = orchestrator(generator.clone());
        let mut session = session(&[CHICKEN_BREAST, EGGS], MealType::Dinner);

        let err = orchestrator.generate(&mut session).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Stage {
                stage: *stage,
                reason: StageFailure::Empty
            }
        );
        assert_eq!(generator.stages_called(), GenerationStage::ALL[..=index].to_vec());
        assert!(!session.has_draft(), "partial draft kept after {} failed", stage);
    }
}

#[tokio::test]
async fn image_request_depends_only_on_title() {
    let generator = Arc::new(FixedTitle {
        inner: FakeGenerator::new(),
        image_inputs: Mutex::new(Vec::new()),
    });
    let orchestrator = orchestrator(generator.clone());

    let mut first = session(&[CHICKEN_BREAST], MealType::Lunch);
    let mut second = session(&[EGGS, 10024], MealType::Dinner);
    let a = orchestrator.generate(&mut first).await.unwrap();
    let b = orchestrator.generate(&mut second).await.unwrap();

    assert_eq!(
        *generator.image_inputs.lock().unwrap(),
        vec!["House Special".to_string(), "House Special".to_string()]
    );
    assert_eq!(a.image_url(), b.image_url());
    assert_ne!(a.description(), b.description());
}

#[tokio::test]
async fn selection_is_deduplicated_and_order_independent() {
    let generator = Arc::new(FakeGenerator::new());
    let orchestrator = orchestrator(generator.clone());

    let mut repeated = session(&[EGGS, CHICKEN_BREAST, EGGS], MealType::Any);
    let mut plain = session(&[CHICKEN_BREAST, EGGS], MealType::Any);
    let a = orchestrator.generate(&mut repeated).await.unwrap();
    let b = orchestrator.generate(&mut plain).await.unwrap();
    assert_eq!(a, b);

    let calls = generator.calls();
    let expected = vec!["CHICKEN BREAST".to_string(), "EGGS".to_string()];
    assert_eq!(
        calls[0],
        GeneratorCall::Title {
            ingredients: expected.clone(),
            meal_type: MealType::Any
        }
    );
    assert_eq!(calls[0], calls[4]);

    let selection: IngredientSelection = [5, 2, 5].into_iter().collect();
    assert_eq!(selection.ids(), vec![2, 5]);
}

// ============================================================================
// Regeneration
// ============================================================================

#[tokio::test]
async fn regenerate_flushes_before_generating() {
    let generator = Arc::new(FakeGenerator::new());
    let orchestrator = orchestrator(generator.clone());
    let mut session = session(&[CHICKEN_BREAST, EGGS], MealType::Breakfast);

    let first = orchestrator.generate(&mut session).await.unwrap();
    let second = orchestrator.regenerate(&mut session).await.unwrap();
    assert_ne!(first.title(), second.title());

    let calls = generator.calls();
    let flush_at = calls
        .iter()
        .position(|c| matches!(c, GeneratorCall::FlushCache { .. }))
        .unwrap();
    assert_eq!(flush_at, GenerationStage::ALL.len());
    assert_eq!(
        calls[flush_at],
        GeneratorCall::FlushCache {
            ingredients: vec!["CHICKEN BREAST".to_string(), "EGGS".to_string()],
            meal_type: MealType::Breakfast,
        }
    );
    assert!(matches!(calls[flush_at + 1], GeneratorCall::Title { .. }));
    assert_eq!(generator.flush_count(), 1);
}

#[tokio::test]
async fn regenerate_clears_draft_after_partial_failure() {
    let generator = Arc::new(FakeGenerator::new());
    let orchestrator = orchestrator(generator.clone());
    let mut session = session(&[EGGS], MealType::Breakfast);

    orchestrator.generate(&mut session).await.unwrap();
    generator.fail_empty(GenerationStage::Description);

    let err = orchestrator.regenerate(&mut session).await.unwrap_err();
    assert_eq!(err.stage(), Some(GenerationStage::Description));
    assert_eq!(session.draft(), &RecipeDraft::default());
    assert_eq!(session.sync_state(), &SyncState::Idle);

    generator.clear_failure();
    let draft = orchestrator.regenerate(&mut session).await.unwrap();
    assert_eq!(session.draft(), &draft.to_draft());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn incomplete_draft_cannot_be_persisted() {
    let missing_body = RecipeDraft {
        title: "Toast".to_string(),
        image_url: "https://img.test/toast.png".to_string(),
        description: "Crunchy".to_string(),
        body: None,
    };
    assert!(missing_body.complete().is_none());

    let missing_image = RecipeDraft {
        image_url: String::new(),
        body: Some(RecipeBody {
            ingredients: vec!["1 slice bread".to_string()],
            sections: Vec::new(),
        }),
        ..missing_body
    };
    assert!(missing_image.complete().is_none());
}

#[tokio::test]
async fn create_failure_skips_upload_and_backfill() {
    let h = harness(
        FakeGenerator::new(),
        MemoryRecipeStore::new().failing_creates(),
        MemoryBlobStorage::new(),
    );
    let mut session = session(&[CHICKEN_BREAST, EGGS], MealType::Breakfast);

    let outcome = h.kitchen.cook(&mut session).await.unwrap();

    let err = outcome.saved.unwrap_err();
    assert_eq!(err.step, PersistStep::Create);
    assert!(h.blobs.uploads().is_empty());
    assert!(h
        .store
        .calls()
        .iter()
        .all(|c| matches!(c, StoreCall::Create { .. })));

    // The generated recipe is still available for display
    assert_eq!(session.draft(), &outcome.draft.to_draft());
    assert_eq!(session.recipe_id(), None);
    assert!(session.should_block_navigation());
}

#[tokio::test]
async fn upload_failure_keeps_transient_image() {
    let h = harness(
        FakeGenerator::new(),
        MemoryRecipeStore::new(),
        MemoryBlobStorage::failing("bucket unavailable"),
    );
    let mut session = session(&[CHICKEN_BREAST, EGGS], MealType::Lunch);

    let outcome = h.kitchen.cook(&mut session).await.unwrap();
    let saved = outcome.saved.unwrap();

    assert_eq!(
        saved.image_ref,
        ImageRef::Transient(outcome.draft.image_url().to_string())
    );
    let stored = h.store.get_recipe(saved.recipe_id).await.unwrap().unwrap();
    assert_eq!(stored.image_ref, saved.image_ref);
    assert!(!h
        .store
        .calls()
        .iter()
        .any(|c| matches!(c, StoreCall::UpdateImage { .. })));
    assert_eq!(session.recipe_id(), Some(saved.recipe_id));
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn breakfast_recipe_saved_with_durable_image() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(FakeGenerator::new());
    let store = Arc::new(FileRecipeStore::new(temp_dir.path().join("recipes")));

    let image_url = "https://images.fake/chicken-breast-and-eggs-breakfast.png";
    let client = MockClient::new().with_bytes(image_url, png_bytes());
    let blobs = Arc::new(DiskBlobStorage::new(
        client,
        temp_dir.path().join("images"),
        "https://cdn.forage.test/images",
    ));

    let kitchen = Kitchen::new(
        orchestrator(generator.clone()),
        PersistenceGateway::new(store.clone(), blobs),
        Arc::new(StaticIdentity::new(Some("user-token".to_string()))),
    );
    let mut session = session(&[CHICKEN_BREAST, EGGS], MealType::Breakfast);

    let outcome = kitchen.cook(&mut session).await.unwrap();
    assert_eq!(outcome.draft.image_url(), image_url);

    let saved = outcome.saved.unwrap();
    assert_eq!(saved.meal_type, MealType::Breakfast);
    assert_eq!(saved.ingredients, "CHICKEN BREAST,EGGS");
    assert_eq!(
        saved.image_ref,
        ImageRef::Durable(format!(
            "https://cdn.forage.test/images/{}.png",
            saved.recipe_id
        ))
    );
    assert!(temp_dir
        .path()
        .join("images")
        .join(format!("{}.png", saved.recipe_id))
        .exists());

    let stored = store.get_recipe(saved.recipe_id).await.unwrap().unwrap();
    assert_eq!(stored, saved);
    assert_eq!(session.recipe_id(), Some(saved.recipe_id));
    assert!(!session.should_block_navigation());
}

#[tokio::test]
async fn empty_title_fails_without_saving() {
    let h = harness(
        FakeGenerator::new().with_empty(GenerationStage::Title),
        MemoryRecipeStore::new(),
        MemoryBlobStorage::new(),
    );
    let mut session = session(&[CHICKEN_BREAST, EGGS], MealType::Breakfast);

    let err = h.kitchen.cook(&mut session).await.unwrap_err();
    assert_eq!(err.stage(), Some(GenerationStage::Title));
    assert_eq!(h.generator.stages_called(), vec![GenerationStage::Title]);
    assert!(h.store.calls().is_empty());
    assert!(h.blobs.uploads().is_empty());
    assert!(!session.should_block_navigation());
}

#[tokio::test]
async fn recook_saves_a_second_recipe() {
    let h = harness(
        FakeGenerator::new(),
        MemoryRecipeStore::new(),
        MemoryBlobStorage::new(),
    );
    let mut session = session(&[CHICKEN_BREAST], MealType::Dinner);

    let first = h.kitchen.cook(&mut session).await.unwrap().saved.unwrap();
    let second = h.kitchen.recook(&mut session).await.unwrap().saved.unwrap();

    assert_ne!(first.recipe_id, second.recipe_id);
    assert_ne!(first.title, second.title);
    assert_eq!(h.store.len().await, 2);
    assert_eq!(session.recipe_id(), Some(second.recipe_id));
}

#[tokio::test]
async fn anonymous_save_blocks_navigation() {
    let generator = Arc::new(FakeGenerator::new());
    let kitchen = Kitchen::new(
        orchestrator(generator),
        PersistenceGateway::new(
            Arc::new(MemoryRecipeStore::new()),
            Arc::new(MemoryBlobStorage::new()),
        ),
        Arc::new(Anonymous),
    );
    let mut session = session(&[EGGS], MealType::Any);

    let saved = kitchen.cook(&mut session).await.unwrap().saved.unwrap();
    assert!(saved.owner.is_anonymous());
    assert!(saved.image_ref.is_durable());
    assert!(session.should_block_navigation());

    session.discard();
    assert!(!session.should_block_navigation());
}
