//! File-based recipe store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{check_can_update, new_record, RecipeStore, StoreError};
use crate::types::{ImageRef, NewRecipe, PersistedRecipe};

/// Stores each recipe as pretty JSON at `{dir}/{recipe_id}.json`.
pub struct FileRecipeStore {
    dir: PathBuf,
}

impl FileRecipeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn recipe_path(&self, recipe_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", recipe_id))
    }

    async fn write(&self, recipe: &PersistedRecipe) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(recipe)?;
        fs::write(self.recipe_path(recipe.recipe_id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for FileRecipeStore {
    async fn create_recipe(
        &self,
        recipe: NewRecipe,
        token: Option<&str>,
    ) -> Result<PersistedRecipe, StoreError> {
        let record = new_record(recipe, token);
        self.write(&record).await?;
        tracing::debug!(recipe_id = %record.recipe_id, dir = %self.dir.display(), "Recipe written");
        Ok(record)
    }

    async fn update_recipe_image(
        &self,
        recipe_id: Uuid,
        image_ref: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut recipe = self
            .get_recipe(recipe_id)
            .await?
            .ok_or(StoreError::NotFound(recipe_id))?;
        check_can_update(&recipe, token)?;
        recipe.image_ref = ImageRef::Durable(image_ref.to_string());
        self.write(&recipe).await
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<PersistedRecipe>, StoreError> {
        let path = self.recipe_path(recipe_id);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
