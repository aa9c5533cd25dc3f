pub mod ai;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod http;
pub mod identity;
pub mod image;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod types;

pub use catalog::{Ingredient, IngredientCatalog};
pub use config::StorageConfig;
pub use error::{CatalogError, FetchError, GenerationError, PersistError, StageFailure};
pub use generator::{AiRecipeGenerator, FakeGenerator, GeneratorCall, GeneratorError, RecipeGenerator};
pub use http::{HttpClient, MockClient, MockResponse, ReqwestClient};
pub use identity::{Anonymous, IdentityProvider, StaticIdentity};
pub use image::{fetch_and_validate_image, validate_image, FetchedImage, MAX_FILE_SIZE};
pub use pipeline::{
    CookOutcome, GenerationReport, Kitchen, Orchestrator, PersistenceGateway, StageTiming,
};
pub use session::{GenerationInputs, IngredientSelection, Session, SyncState};
pub use store::{
    BlobStorage, DiskBlobStorage, FileRecipeStore, MemoryBlobStorage, MemoryRecipeStore,
    RecipeStore, StoreCall, StoreError,
};
pub use types::{
    CompleteDraft, GenerationStage, ImageRef, MealType, NewRecipe, Ownership, PersistStep,
    PersistedRecipe, RecipeBody, RecipeDraft, RecipeSection,
};
