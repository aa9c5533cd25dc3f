//! Saving a complete draft to the recipe store and blob storage.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use crate::error::PersistError;
use crate::store::{BlobStorage, RecipeStore};
use crate::types::{CompleteDraft, ImageRef, MealType, NewRecipe, PersistStep, PersistedRecipe};

/// Persists complete drafts in three steps: create, upload, back-fill.
///
/// Only a failed create fails the call. If the image cannot be moved to blob
/// storage or the record cannot be updated, the recipe is still returned and
/// keeps the transient image URL.
pub struct PersistenceGateway {
    store: Arc<dyn RecipeStore>,
    blobs: Arc<dyn BlobStorage>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn RecipeStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        Self { store, blobs }
    }

    pub fn store(&self) -> &Arc<dyn RecipeStore> {
        &self.store
    }

    pub async fn persist(
        &self,
        draft: &CompleteDraft,
        ingredient_names: &[String],
        meal_type: MealType,
        token: Option<&str>,
    ) -> Result<PersistedRecipe, PersistError> {
        let new_recipe = NewRecipe::from_draft(draft, ingredient_names, meal_type);

        let mut recipe = self
            .store
            .create_recipe(new_recipe, token)
            .instrument(info_span!("persist_step", step = %PersistStep::Create))
            .await
            .map_err(|e| PersistError::new(PersistStep::Create, e.to_string()))?;

        tracing::info!(
            recipe_id = %recipe.recipe_id,
            title = %recipe.title,
            anonymous = recipe.owner.is_anonymous(),
            "Created recipe"
        );

        match self.move_image(&recipe, draft.image_url(), token).await {
            Ok(durable) => recipe.image_ref = ImageRef::Durable(durable),
            Err(e) => {
                tracing::warn!(
                    recipe_id = %recipe.recipe_id,
                    step = %e.step,
                    error = %e.message,
                    "Recipe saved with transient image URL"
                );
            }
        }

        Ok(recipe)
    }

    /// Upload the image and point the record at the durable copy.
    async fn move_image(
        &self,
        recipe: &PersistedRecipe,
        source_url: &str,
        token: Option<&str>,
    ) -> Result<String, PersistError> {
        let durable = self
            .blobs
            .upload_image(recipe.recipe_id, source_url)
            .instrument(info_span!("persist_step", step = %PersistStep::Upload))
            .await
            .map_err(|e| PersistError::new(PersistStep::Upload, e.to_string()))?;

        self.store
            .update_recipe_image(recipe.recipe_id, &durable, token)
            .instrument(info_span!("persist_step", step = %PersistStep::Backfill))
            .await
            .map_err(|e| PersistError::new(PersistStep::Backfill, e.to_string()))?;

        Ok(durable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBlobStorage, MemoryRecipeStore, StoreCall};
    use crate::types::{RecipeBody, RecipeDraft, RecipeSection};

    fn draft() -> CompleteDraft {
        RecipeDraft {
            title: "Walnut Brownies".to_string(),
            image_url: "https://img.test/brownies.png".to_string(),
            description: "Fudgy".to_string(),
            body: Some(RecipeBody {
                ingredients: vec!["100g walnuts".to_string()],
                sections: vec![RecipeSection {
                    title: "Bake".to_string(),
                    steps: vec!["Bake 25 minutes.".to_string()],
                }],
            }),
        }
        .complete()
        .unwrap()
    }

    fn names() -> Vec<String> {
        vec!["MILK CHOCOLATE".to_string(), "WALNUTS".to_string()]
    }

    #[tokio::test]
    async fn test_persist_moves_image() {
        let store = Arc::new(MemoryRecipeStore::new());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let gateway = PersistenceGateway::new(store.clone(), blobs.clone());

        let recipe = gateway
            .persist(&draft(), &names(), MealType::Any, Some("tok"))
            .await
            .unwrap();

        assert_eq!(recipe.ingredients, "MILK CHOCOLATE,WALNUTS");
        assert!(recipe.image_ref.is_durable());
        assert_eq!(
            blobs.uploads(),
            vec![(recipe.recipe_id, "https://img.test/brownies.png".to_string())]
        );

        let stored = store.get_recipe(recipe.recipe_id).await.unwrap().unwrap();
        assert_eq!(stored.image_ref, recipe.image_ref);
    }

    #[tokio::test]
    async fn test_backfill_failure_keeps_transient() {
        let store = Arc::new(MemoryRecipeStore::new().failing_backfills());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let gateway = PersistenceGateway::new(store.clone(), blobs.clone());

        let recipe = gateway
            .persist(&draft(), &names(), MealType::Any, None)
            .await
            .unwrap();

        assert_eq!(
            recipe.image_ref,
            ImageRef::Transient("https://img.test/brownies.png".to_string())
        );
        assert_eq!(blobs.uploads().len(), 1);
        assert!(matches!(store.calls()[1], StoreCall::UpdateImage { .. }));
    }

    #[tokio::test]
    async fn test_create_failure_stops_everything() {
        let store = Arc::new(MemoryRecipeStore::new().failing_creates());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let gateway = PersistenceGateway::new(store.clone(), blobs.clone());

        let err = gateway
            .persist(&draft(), &names(), MealType::Any, None)
            .await
            .unwrap_err();

        assert_eq!(err.step, PersistStep::Create);
        assert_eq!(store.calls().len(), 1);
        assert!(blobs.uploads().is_empty());
    }
}
