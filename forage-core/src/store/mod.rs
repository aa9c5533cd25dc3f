//! Recipe store and blob storage backends.
//!
//! [`RecipeStore`] holds recipe records, [`BlobStorage`] holds their images.
//! Both are traits so the gateway can run against the in-memory backends in
//! tests and the disk backends from the CLI.

mod blob;
mod file;
mod memory;

pub use blob::{DiskBlobStorage, MemoryBlobStorage};
pub use file::FileRecipeStore;
pub use memory::{MemoryRecipeStore, StoreCall};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::image::ImageError;
use crate::types::{NewRecipe, Ownership, PersistedRecipe};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Recipe not found: {0}")]
    NotFound(Uuid),

    #[error("Not allowed to modify recipe {0}")]
    Forbidden(Uuid),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable store of recipe records.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Create a record and assign its id. A missing token writes an
    /// anonymous record.
    async fn create_recipe(
        &self,
        recipe: NewRecipe,
        token: Option<&str>,
    ) -> Result<PersistedRecipe, StoreError>;

    /// Replace the record's image with a durable reference.
    async fn update_recipe_image(
        &self,
        recipe_id: Uuid,
        image_ref: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<PersistedRecipe>, StoreError>;
}

/// Durable storage for recipe images.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Copy the image at `source_url` under `recipe_id` and return a durable
    /// reference to it.
    async fn upload_image(&self, recipe_id: Uuid, source_url: &str) -> Result<String, StoreError>;
}

/// Ownership recorded for a write made with `token`.
///
/// Tokens are never stored; the record keeps a short sha256 fingerprint.
pub fn ownership_for(token: Option<&str>) -> Ownership {
    match token {
        Some(token) => Ownership::User {
            fingerprint: token_fingerprint(token),
        },
        None => Ownership::Anonymous,
    }
}

fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let hex = hex::encode(hasher.finalize());
    hex[..16].to_string()
}

/// Anonymous records can be updated by anyone; owned records only by the
/// same token holder.
pub(crate) fn check_can_update(
    recipe: &PersistedRecipe,
    token: Option<&str>,
) -> Result<(), StoreError> {
    match (&recipe.owner, token) {
        (Ownership::Anonymous, _) => Ok(()),
        (Ownership::User { fingerprint }, Some(token)) if *fingerprint == token_fingerprint(token) => {
            Ok(())
        }
        _ => Err(StoreError::Forbidden(recipe.recipe_id)),
    }
}

/// Build the stored record for a newly created recipe.
pub(crate) fn new_record(recipe: NewRecipe, token: Option<&str>) -> PersistedRecipe {
    PersistedRecipe {
        recipe_id: Uuid::new_v4(),
        ingredients: recipe.ingredients,
        title: recipe.title,
        description: recipe.description,
        body: recipe.body,
        meal_type: recipe.meal_type,
        image_ref: crate::types::ImageRef::Transient(recipe.image_url),
        owner: ownership_for(token),
        created_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MealType, RecipeBody};

    fn new_recipe() -> NewRecipe {
        NewRecipe {
            ingredients: "EGGS".to_string(),
            title: "Omelette".to_string(),
            description: "Fluffy".to_string(),
            body: RecipeBody::default(),
            meal_type: MealType::Breakfast,
            image_url: "https://img.test/1.png".to_string(),
        }
    }

    #[test]
    fn test_ownership_fingerprint_is_stable() {
        let a = ownership_for(Some("secret"));
        let b = ownership_for(Some("secret"));
        assert_eq!(a, b);
        assert_ne!(a, ownership_for(Some("other")));
        assert_eq!(ownership_for(None), Ownership::Anonymous);

        match a {
            Ownership::User { fingerprint } => {
                assert_eq!(fingerprint.len(), 16);
                assert!(!fingerprint.contains("secret"));
            }
            Ownership::Anonymous => panic!("expected user ownership"),
        }
    }

    #[test]
    fn test_check_can_update() {
        let owned = new_record(new_recipe(), Some("secret"));
        assert!(check_can_update(&owned, Some("secret")).is_ok());
        assert!(matches!(
            check_can_update(&owned, Some("other")),
            Err(StoreError::Forbidden(_))
        ));
        assert!(check_can_update(&owned, None).is_err());

        let anonymous = new_record(new_recipe(), None);
        assert!(check_can_update(&anonymous, None).is_ok());
        assert!(check_can_update(&anonymous, Some("secret")).is_ok());
    }

    #[test]
    fn test_new_record_starts_transient() {
        let record = new_record(new_recipe(), None);
        assert!(!record.image_ref.is_durable());
        assert_eq!(record.image_ref.url(), "https://img.test/1.png");
    }
}
