//! Recipe registry: insertion-ordered recipes, ingredient variant codecs,
//! and category membership.
//!
//! Registration order is an implicit recipe priority: matching returns the
//! first registered recipe whose yield is at least one. The variant codec
//! table maps a wire type tag to a deserialization function and is explicit
//! registry state, never a process-wide static.

use crate::id::Key;
use crate::ingredient::{
    Basket, CategoryIndex, IngredientVariant, TAG_CATEGORY, TAG_ESSENCE, TAG_ITEM, document_amount,
};
use crate::recipe::Recipe;
use serde_json::{Map, Value};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate recipe id: {0}")]
    DuplicateRecipe(Key),
}

/// Errors from variant document decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("ingredient document is not an object")]
    NotAnObject,
    #[error("ingredient document missing 'type' tag")]
    MissingType,
    #[error("unknown ingredient type: {0}")]
    UnknownType(String),
    #[error("missing or malformed field '{0}'")]
    BadField(&'static str),
    #[error("amount must be a positive integer")]
    BadAmount,
}

/// Deserializer for one variant type tag. Receives the document's fields
/// (including `"amount"`) and produces a validated variant.
pub type VariantCodec =
    Box<dyn Fn(&Map<String, Value>) -> Result<IngredientVariant, CodecError> + Send + Sync>;

// ---------------------------------------------------------------------------
// RecipeRegistry
// ---------------------------------------------------------------------------

/// Holds all recipes, the variant codec table, and the category index.
///
/// Owned by the host context and passed by reference into the scheduler and
/// hook call sites.
pub struct RecipeRegistry {
    recipes: Vec<Recipe>,
    by_id: HashMap<Key, usize>,
    codecs: HashMap<Key, VariantCodec>,
    categories: CategoryIndex,
    builtin_count: usize,
    sealed: bool,
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeRegistry {
    /// Create a registry with the three built-in variant codecs registered.
    pub fn new() -> Self {
        let mut registry = Self {
            recipes: Vec::new(),
            by_id: HashMap::new(),
            codecs: HashMap::new(),
            categories: CategoryIndex::new(),
            builtin_count: 0,
            sealed: false,
        };
        registry.register_variant(
            Key::new(TAG_ITEM).expect("builtin tag"),
            Box::new(|map| {
                let item = key_field(map, "item")?;
                let amount = document_amount(map).ok_or(CodecError::BadAmount)?;
                Ok(IngredientVariant::Item { item, amount })
            }),
        );
        registry.register_variant(
            Key::new(TAG_CATEGORY).expect("builtin tag"),
            Box::new(|map| {
                let category = key_field(map, "category")?;
                let amount = document_amount(map).ok_or(CodecError::BadAmount)?;
                Ok(IngredientVariant::Category { category, amount })
            }),
        );
        registry.register_variant(
            Key::new(TAG_ESSENCE).expect("builtin tag"),
            Box::new(|map| {
                let entity = key_field(map, "entity")?;
                let amount = document_amount(map).ok_or(CodecError::BadAmount)?;
                Ok(IngredientVariant::Essence { entity, amount })
            }),
        );
        registry
    }

    /// Register a recipe. Registration order is matching priority.
    pub fn register(&mut self, recipe: Recipe) -> Result<(), RegistryError> {
        if self.by_id.contains_key(recipe.id()) {
            return Err(RegistryError::DuplicateRecipe(recipe.id().clone()));
        }
        self.by_id.insert(recipe.id().clone(), self.recipes.len());
        self.recipes.push(recipe);
        if !self.sealed {
            self.builtin_count = self.recipes.len();
        }
        Ok(())
    }

    /// Mark the end of built-in registration: recipes registered afterwards
    /// count as external in load summaries.
    pub fn seal_builtin(&mut self) {
        self.sealed = true;
    }

    /// The first registered recipe with yield >= 1 against the basket.
    pub fn applicable_recipe(&self, basket: &Basket) -> Option<&Recipe> {
        self.recipes
            .iter()
            .find(|r| r.yield_from(basket, &self.categories) >= 1)
    }

    pub fn get(&self, id: &Key) -> Option<&Recipe> {
        self.by_id.get(id).map(|&idx| &self.recipes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn builtin_count(&self) -> usize {
        self.builtin_count
    }

    pub fn external_count(&self) -> usize {
        self.recipes.len() - self.builtin_count
    }

    /// Clear all recipes (reload path). Codecs and categories survive.
    pub fn clear_recipes(&mut self) {
        self.recipes.clear();
        self.by_id.clear();
        self.builtin_count = 0;
        self.sealed = false;
    }

    /// Register a variant deserializer under its wire type tag.
    pub fn register_variant(&mut self, tag: Key, codec: VariantCodec) {
        self.codecs.insert(tag, codec);
    }

    /// Decode one ingredient document (`{"type": tag, ..., "amount": n}`)
    /// through the codec table.
    pub fn decode_variant(&self, doc: &Value) -> Result<IngredientVariant, CodecError> {
        let map = doc.as_object().ok_or(CodecError::NotAnObject)?;
        let tag = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingType)?;
        let tag = Key::new(tag).map_err(|_| CodecError::UnknownType(tag.to_string()))?;
        let codec = self
            .codecs
            .get(&tag)
            .ok_or_else(|| CodecError::UnknownType(tag.to_string()))?;
        codec(map)
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategoryIndex {
        &mut self.categories
    }
}

impl std::fmt::Debug for RecipeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeRegistry")
            .field("recipes", &self.recipes.len())
            .field("codecs", &self.codecs.len())
            .field("builtin_count", &self.builtin_count)
            .finish()
    }
}

fn key_field(map: &Map<String, Value>, field: &'static str) -> Result<Key, CodecError> {
    map.get(field)
        .and_then(Value::as_str)
        .and_then(|s| Key::new(s).ok())
        .ok_or(CodecError::BadField(field))
}
