//! `forage generate`: cook a recipe and save it to the local data directory.

use std::sync::Arc;

use anyhow::{bail, Result};
use forage_core::ai::{AiConfig, CachingAiClient, HttpImageClient};
use forage_core::{
    AiRecipeGenerator, CookOutcome, DiskBlobStorage, FakeGenerator, FileRecipeStore,
    IngredientCatalog, Kitchen, MealType, Orchestrator, PersistenceGateway, RecipeGenerator,
    ReqwestClient, Session, StaticIdentity, StorageConfig, SyncState,
};

pub async fn generate(ids: &[u32], meal: MealType, fake: bool, regenerate: bool) -> Result<()> {
    let catalog = IngredientCatalog::builtin();
    if let Some(unknown) = ids.iter().find(|id| catalog.name(**id).is_none()) {
        bail!(
            "Unknown ingredient id {} (run `forage ingredients` to list known ids)",
            unknown
        );
    }

    let generator: Arc<dyn RecipeGenerator> = if fake {
        Arc::new(FakeGenerator::new())
    } else {
        let config = AiConfig::from_env()?;
        let images = HttpImageClient::new(&config);
        Arc::new(AiRecipeGenerator::new(
            Arc::new(CachingAiClient::new(config)),
            Arc::new(images),
        ))
    };

    let storage = StorageConfig::from_env();
    let store = Arc::new(FileRecipeStore::new(storage.recipes_dir()));
    let blobs = Arc::new(DiskBlobStorage::new(
        ReqwestClient::new()?,
        storage.images_dir(),
        &storage.image_base_url,
    ));
    let identity = Arc::new(StaticIdentity::new(storage.identity_token.clone()));

    let kitchen = Kitchen::new(
        Orchestrator::new(generator, catalog),
        PersistenceGateway::new(store, blobs),
        identity,
    )
    .with_identity_template(storage.identity_template.clone());

    let mut session = Session::new(ids.iter().copied().collect(), meal);

    let outcome = kitchen.cook(&mut session).await?;
    print_outcome(&outcome);

    if regenerate {
        println!();
        let outcome = kitchen.recook(&mut session).await?;
        print_outcome(&outcome);
    }

    if let Some(warning) = unsaved_warning(session.sync_state()) {
        println!();
        for line in warning {
            println!("{}", line);
        }
    }

    Ok(())
}

/// What to tell the user before exit when the recipe could be lost.
fn unsaved_warning(state: &SyncState) -> Option<[&'static str; 2]> {
    match state {
        SyncState::Unsynced | SyncState::SaveFailed(_) => Some([
            "Warning: this recipe was not saved and will be lost.",
            "Check that the data directory is writable, then generate again.",
        ]),
        SyncState::Saved(recipe) if recipe.owner.is_anonymous() => Some([
            "Warning: this recipe is not linked to you and may be lost.",
            "Set FORAGE_IDENTITY_TOKEN to save recipes under your identity.",
        ]),
        SyncState::Saved(_) | SyncState::Idle => None,
    }
}

fn print_outcome(outcome: &CookOutcome) {
    let draft = &outcome.draft;
    println!("{}", draft.title());
    println!("{}", "=".repeat(draft.title().chars().count()));
    println!();
    println!("{}", draft.description());
    println!();

    let body = draft.body();
    println!("Ingredients:");
    for line in &body.ingredients {
        println!("  - {}", line);
    }
    for section in &body.sections {
        println!();
        println!("{}:", section.title);
        for (i, step) in section.steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
    println!();

    match &outcome.saved {
        Ok(recipe) => {
            let image_kind = if recipe.image_ref.is_durable() {
                "stored"
            } else {
                "temporary link"
            };
            println!("Saved as {}", recipe.recipe_id);
            println!("Image ({}): {}", image_kind, recipe.image_ref.url());
        }
        Err(e) => {
            println!("Image: {}", draft.image_url());
            println!("Not saved: {}", e);
        }
    }
}
