//! Immutable cauldron recipes and the scarcity-limited yield computation.

use crate::id::Key;
use crate::ingredient::{Basket, CategoryIndex, IngredientVariant, WorldStack};

/// Minimum number of distinct requirements per recipe.
pub const MIN_INGREDIENTS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe '{0}' requires at least {MIN_INGREDIENTS} ingredients, got {1}")]
    TooFewIngredients(Key, usize),
    #[error("recipe '{0}' has a zero-amount result")]
    ZeroResult(Key),
}

/// An immutable cauldron recipe.
///
/// Constructed once at load time (from a recipe document or via
/// [`RecipeBuilder`]) and never mutated; destroyed only by registry
/// clear/reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: Key,
    ingredients: Vec<IngredientVariant>,
    result: WorldStack,
    experience: u32,
    name: Option<String>,
    description: Option<String>,
    comment: Option<String>,
    permission: Key,
}

impl Recipe {
    pub fn builder(id: Key, result: WorldStack) -> RecipeBuilder {
        RecipeBuilder {
            id,
            result,
            ingredients: Vec::new(),
            experience: 0,
            name: None,
            description: None,
            comment: None,
            permission: None,
        }
    }

    pub fn id(&self) -> &Key {
        &self.id
    }

    /// Required (variant-shape, amount) pairs, in declaration order.
    pub fn ingredients(&self) -> &[IngredientVariant] {
        &self.ingredients
    }

    pub fn result(&self) -> &WorldStack {
        &self.result
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Recipe-specific crafting permission tag.
    pub fn permission(&self) -> &Key {
        &self.permission
    }

    /// The scarcity-limited integer multiple of this recipe the basket could
    /// satisfy.
    ///
    /// For each requirement, the first basket entry that is accepted by the
    /// requirement shape and holds at least the required amount contributes
    /// `available / required` (integer division); the yield is the minimum
    /// across requirements, or 0 as soon as any requirement has no
    /// satisfying entry.
    pub fn yield_from(&self, basket: &Basket, categories: &CategoryIndex) -> u32 {
        let mut best = u32::MAX;
        for req in &self.ingredients {
            let required = req.amount();
            let Some(entry) = basket
                .iter()
                .find(|e| req.accepts(e, categories) && e.amount() >= required)
            else {
                return 0;
            };
            best = best.min(entry.amount() / required);
        }
        best
    }
}

/// Builder for programmatic recipe construction.
#[derive(Debug)]
pub struct RecipeBuilder {
    id: Key,
    result: WorldStack,
    ingredients: Vec<IngredientVariant>,
    experience: u32,
    name: Option<String>,
    description: Option<String>,
    comment: Option<String>,
    permission: Option<Key>,
}

impl RecipeBuilder {
    pub fn ingredient(mut self, requirement: IngredientVariant) -> Self {
        self.ingredients.push(requirement);
        self
    }

    pub fn experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn permission(mut self, permission: Key) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Validate and freeze. Requires at least [`MIN_INGREDIENTS`]
    /// requirements and a positive result amount. The permission defaults to
    /// `<namespace>:craft.<path>` derived from the recipe id.
    pub fn build(self) -> Result<Recipe, RecipeError> {
        if self.ingredients.len() < MIN_INGREDIENTS {
            return Err(RecipeError::TooFewIngredients(
                self.id,
                self.ingredients.len(),
            ));
        }
        if self.result.amount == 0 {
            return Err(RecipeError::ZeroResult(self.id));
        }
        let permission = match self.permission {
            Some(p) => p,
            None => Key::new(&format!(
                "{}:craft.{}",
                self.id.namespace(),
                self.id.path()
            ))
            .expect("derived permission key is well-formed"),
        };
        Ok(Recipe {
            id: self.id,
            ingredients: self.ingredients,
            result: self.result,
            experience: self.experience,
            name: self.name,
            description: self.description,
            comment: self.comment,
            permission,
        })
    }
}
