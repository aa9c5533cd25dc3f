//! Per-session generation state.
//!
//! A [`Session`] owns the user's ingredient selection, meal type, the current
//! draft and whether that draft has been durably saved. Orchestrator and
//! kitchen operations borrow it mutably, so two attempts can never overlap on
//! the same session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PersistError;
use crate::types::{MealType, PersistedRecipe, RecipeDraft};

/// Unique, ascending set of ingredient ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSelection(BTreeSet<u32>);

impl IngredientSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already selected.
    pub fn insert(&mut self, id: u32) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        self.0.remove(&id)
    }

    /// Checkbox semantics: select when `checked`, deselect otherwise.
    pub fn set(&mut self, id: u32, checked: bool) {
        if checked {
            self.0.insert(id);
        } else {
            self.0.remove(&id);
        }
    }

    /// Flip the id's membership. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: u32) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.contains(&id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<u32> for IngredientSelection {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether the session's result has reached the recipe store.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SyncState {
    /// No complete result yet
    #[default]
    Idle,
    /// Generation finished; persistence not attempted or still running
    Unsynced,
    Saved(PersistedRecipe),
    SaveFailed(PersistError),
}

/// Resolved ingredient names and meal type a draft was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInputs {
    pub ingredients: Vec<String>,
    pub meal_type: MealType,
}

/// Session-scoped state shared by the orchestrator and the kitchen.
///
/// `selection` and `meal_type` are live UI inputs and may change after a
/// draft exists; saving uses the inputs captured when the draft was made.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub selection: IngredientSelection,
    pub meal_type: MealType,
    pub(crate) draft: RecipeDraft,
    pub(crate) generated_from: Option<GenerationInputs>,
    pub(crate) sync: SyncState,
}

impl Session {
    pub fn new(selection: IngredientSelection, meal_type: MealType) -> Self {
        Self {
            selection,
            meal_type,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    /// Inputs of the current complete draft.
    pub fn generated_from(&self) -> Option<&GenerationInputs> {
        self.generated_from.as_ref()
    }

    /// Clear the draft and sync state. Selection and meal type are kept.
    pub fn reset(&mut self) {
        self.draft = RecipeDraft::default();
        self.generated_from = None;
        self.sync = SyncState::Idle;
    }

    /// The user explicitly abandons the current result.
    pub fn discard(&mut self) {
        if self.has_unsynced_result() {
            tracing::info!(title = %self.draft.title, "Discarding unsaved recipe");
        }
        self.reset();
    }

    pub fn has_draft(&self) -> bool {
        !self.draft.is_empty()
    }

    /// A complete result exists that is not durably saved.
    pub fn has_unsynced_result(&self) -> bool {
        matches!(self.sync, SyncState::Unsynced | SyncState::SaveFailed(_))
    }

    /// Id of the saved record. `None` until persistence succeeded.
    pub fn recipe_id(&self) -> Option<Uuid> {
        match &self.sync {
            SyncState::Saved(recipe) => Some(recipe.recipe_id),
            _ => None,
        }
    }

    pub fn saved_recipe(&self) -> Option<&PersistedRecipe> {
        match &self.sync {
            SyncState::Saved(recipe) => Some(recipe),
            _ => None,
        }
    }

    /// Whether leaving the session now would lose the user's recipe.
    ///
    /// True for an unsynced result, and for a result saved without an identity
    /// token: nothing links an anonymous record back to the user.
    pub fn should_block_navigation(&self) -> bool {
        match &self.sync {
            SyncState::Unsynced | SyncState::SaveFailed(_) => true,
            SyncState::Saved(recipe) => recipe.owner.is_anonymous(),
            SyncState::Idle => false,
        }
    }

    pub(crate) fn mark_unsynced(&mut self, inputs: GenerationInputs) {
        self.generated_from = Some(inputs);
        self.sync = SyncState::Unsynced;
    }

    pub(crate) fn record_persist_result(&mut self, result: &Result<PersistedRecipe, PersistError>) {
        self.sync = match result {
            Ok(recipe) => SyncState::Saved(recipe.clone()),
            Err(e) => SyncState::SaveFailed(e.clone()),
        };
    }
}
