//! Ingredient catalog: maps USDA ingredient ids to display names.
//!
//! The built-in catalog is embedded at compile time from
//! `data/ingredients.json` and parsed once on first use.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::session::IngredientSelection;

/// An ingredient the user can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: u32,
    pub name: String,
}

/// On-disk data format.
#[derive(Deserialize)]
struct CatalogDataFile {
    ingredients: HashMap<u32, String>,
    #[serde(default)]
    popular: Vec<u32>,
}

static INGREDIENTS_JSON: &str = include_str!("../data/ingredients.json");

static BUILTIN: LazyLock<Arc<IngredientCatalog>> = LazyLock::new(|| {
    let data: CatalogDataFile =
        serde_json::from_str(INGREDIENTS_JSON).expect("ingredients.json should be valid JSON");
    Arc::new(IngredientCatalog::from_parts(data.ingredients, &data.popular))
});

/// Id to name lookup plus the featured ("popular") ingredient list.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    names: HashMap<u32, String>,
    popular: Vec<Ingredient>,
}

impl IngredientCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Arc<IngredientCatalog> {
        Arc::clone(&BUILTIN)
    }

    /// Build a catalog from `(id, name)` pairs with no popular list.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let names = entries
            .into_iter()
            .map(|(id, name)| (id, name.into()))
            .collect();
        Self::from_parts(names, &[])
    }

    fn from_parts(names: HashMap<u32, String>, popular_ids: &[u32]) -> Self {
        // Popular ids missing from the name table are skipped
        let popular = popular_ids
            .iter()
            .filter_map(|id| {
                names.get(id).map(|name| Ingredient {
                    id: *id,
                    name: name.clone(),
                })
            })
            .collect();
        Self { names, popular }
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn popular(&self) -> &[Ingredient] {
        &self.popular
    }

    /// Resolve a selection to names, in ascending id order.
    pub fn resolve(&self, selection: &IngredientSelection) -> Result<Vec<String>, CatalogError> {
        selection
            .ids()
            .into_iter()
            .map(|id| {
                self.name(id)
                    .map(str::to_string)
                    .ok_or(CatalogError::UnknownIngredient(id))
            })
            .collect()
    }
}
