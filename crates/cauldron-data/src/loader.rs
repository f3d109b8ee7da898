//! Bulk recipe loading: one JSON file per recipe, per-file failure capture.
//!
//! A malformed document never aborts the batch: it is recorded as a
//! [`LoadFailure`] (identifier + human-readable reason) in the returned
//! [`LoadSummary`], which also reports built-in vs. externally loaded recipe
//! counts and the total elapsed time.

use crate::schema::RecipeDoc;
use cauldron_core::id::{Key, KeyError};
use cauldron_core::ingredient::WorldStack;
use cauldron_core::recipe::{Recipe, RecipeError};
use cauldron_core::registry::{CodecError, RecipeRegistry, RegistryError};
use std::path::Path;
use std::time::{Duration, Instant};

// ===========================================================================
// Errors
// ===========================================================================

/// Why one recipe document failed to load.
#[derive(Debug, thiserror::Error)]
pub enum RecipeLoadError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a namespaced key: {0}")]
    BadKey(#[from] KeyError),
    #[error("ingredient {index}: {source}")]
    BadIngredient {
        index: usize,
        source: CodecError,
    },
    #[error(transparent)]
    Invalid(#[from] RecipeError),
    #[error(transparent)]
    Rejected(#[from] RegistryError),
}

/// A recipe file that could not be loaded, and why.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub id: String,
    pub reason: String,
}

/// Result of one bulk load pass.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Recipes registered programmatically before the load.
    pub builtin: usize,
    /// Recipes loaded from documents.
    pub external: usize,
    pub failures: Vec<LoadFailure>,
    pub elapsed: Duration,
}

// ===========================================================================
// Parsing
// ===========================================================================

/// Parse one recipe document against the registry's variant codecs.
pub fn parse_recipe(
    id: Key,
    json: &str,
    registry: &RecipeRegistry,
) -> Result<Recipe, RecipeLoadError> {
    let doc: RecipeDoc = serde_json::from_str(json)?;
    let result = WorldStack::new(Key::new(&doc.result.item)?, doc.result.amount);
    let mut builder = Recipe::builder(id, result).experience(doc.experience);
    for (index, ingredient) in doc.ingredients.iter().enumerate() {
        let variant = registry
            .decode_variant(ingredient)
            .map_err(|source| RecipeLoadError::BadIngredient { index, source })?;
        builder = builder.ingredient(variant);
    }
    if let Some(name) = &doc.name {
        builder = builder.name(name);
    }
    if let Some(description) = &doc.description {
        builder = builder.description(description);
    }
    if let Some(comment) = &doc.comment {
        builder = builder.comment(comment);
    }
    Ok(builder.build()?)
}

// ===========================================================================
// Directory loading
// ===========================================================================

/// Load every `*.json` recipe in `dir` into the registry.
///
/// The recipe id is derived from the file stem, namespaced under `file:` so
/// directory loads never collide with programmatic ids. Recipes already in
/// the registry are sealed as built-in before the load begins.
pub fn load_recipe_dir(
    dir: &Path,
    registry: &mut RecipeRegistry,
) -> Result<LoadSummary, std::io::Error> {
    let start = Instant::now();
    registry.seal_builtin();
    let mut failures = Vec::new();

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // Deterministic registration order regardless of directory iteration.
    paths.sort();

    for path in paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let id = format!("file:{stem}");
        match load_one(&id, &path, registry) {
            Ok(()) => {}
            Err(err) => {
                log::warn!("skipping recipe '{id}': {err}");
                failures.push(LoadFailure {
                    id,
                    reason: err.to_string(),
                });
            }
        }
    }

    let summary = LoadSummary {
        builtin: registry.builtin_count(),
        external: registry.external_count(),
        failures,
        elapsed: start.elapsed(),
    };
    log::info!(
        "loaded {} recipes ({} built-in, {} external, {} failed) in {:?}",
        summary.builtin + summary.external,
        summary.builtin,
        summary.external,
        summary.failures.len(),
        summary.elapsed
    );
    Ok(summary)
}

fn load_one(id: &str, path: &Path, registry: &mut RecipeRegistry) -> Result<(), RecipeLoadError> {
    let id = Key::new(id)?;
    let json = std::fs::read_to_string(path)?;
    let recipe = parse_recipe(id, &json, registry)?;
    registry.register(recipe)?;
    Ok(())
}
