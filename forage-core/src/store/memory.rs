//! In-memory recipe store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_can_update, new_record, RecipeStore, StoreError};
use crate::types::{ImageRef, NewRecipe, PersistedRecipe};

/// A call received by [`MemoryRecipeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create { title: String, with_token: bool },
    UpdateImage { recipe_id: Uuid, image_ref: String },
}

/// Recipe store backed by a map, with a call log and failure injection.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    recipes: RwLock<HashMap<Uuid, PersistedRecipe>>,
    calls: Mutex<Vec<StoreCall>>,
    create_failures: AtomicUsize,
    failing_backfills: bool,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_recipe` call fail.
    pub fn failing_creates(self) -> Self {
        self.failing_first_creates(usize::MAX)
    }

    /// Make the next `count` `create_recipe` calls fail.
    pub fn failing_first_creates(self, count: usize) -> Self {
        self.create_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Make every `update_recipe_image` call fail.
    pub fn failing_backfills(mut self) -> Self {
        self.failing_backfills = true;
        self
    }

    /// All calls received, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.recipes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.recipes.read().await.is_empty()
    }

    fn record(&self, call: StoreCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn create_recipe(
        &self,
        recipe: NewRecipe,
        token: Option<&str>,
    ) -> Result<PersistedRecipe, StoreError> {
        self.record(StoreCall::Create {
            title: recipe.title.clone(),
            with_token: token.is_some(),
        });
        let fail = self
            .create_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(StoreError::Unavailable("recipe store is down".to_string()));
        }

        let record = new_record(recipe, token);
        self.recipes
            .write()
            .await
            .insert(record.recipe_id, record.clone());
        Ok(record)
    }

    async fn update_recipe_image(
        &self,
        recipe_id: Uuid,
        image_ref: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::UpdateImage {
            recipe_id,
            image_ref: image_ref.to_string(),
        });
        if self.failing_backfills {
            return Err(StoreError::Unavailable("recipe store is down".to_string()));
        }

        let mut recipes = self.recipes.write().await;
        let recipe = recipes
            .get_mut(&recipe_id)
            .ok_or(StoreError::NotFound(recipe_id))?;
        check_can_update(recipe, token)?;
        recipe.image_ref = ImageRef::Durable(image_ref.to_string());
        Ok(())
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<PersistedRecipe>, StoreError> {
        Ok(self.recipes.read().await.get(&recipe_id).cloned())
    }
}
