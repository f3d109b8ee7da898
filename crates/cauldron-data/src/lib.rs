//! Data-driven recipe loading for the cauldron simulation core.
//!
//! Recipes live as one JSON document per file; [`loader::load_recipe_dir`]
//! bulk-loads a directory into a [`cauldron_core::registry::RecipeRegistry`],
//! capturing per-file failures in a [`loader::LoadSummary`] instead of
//! aborting the batch.

pub mod loader;
pub mod schema;
