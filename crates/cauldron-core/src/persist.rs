//! Whole-file JSON persistence for cauldron state.
//!
//! Cauldrons are flushed to an array of documents at shutdown and rebuilt at
//! startup, strictly outside the scheduler's tick loop. A document whose
//! position no longer holds a valid container is silently dropped; a
//! malformed document is skipped with a per-entity failure record while the
//! rest of the batch continues.

use crate::cauldron::{Cauldron, HeatState};
use crate::collection::CauldronRegistry;
use crate::config::CauldronConfig;
use crate::host::Host;
use crate::id::{BlockPos, WorldId};
use crate::ingredient::Basket;
use crate::registry::RecipeRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One persisted cauldron document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauldronDoc {
    pub world: WorldId,
    pub cauldron: BlockPos,
    /// Host time at which heating began; -1 when not heating.
    #[serde(rename = "heatingStartTime", default = "no_heating_start")]
    pub heating_start_time: i64,
    #[serde(rename = "heatingUp", default)]
    pub heating_up: bool,
    #[serde(default)]
    pub bubbling: bool,
    /// Variant documents in basket order; absent means an empty basket.
    #[serde(default)]
    pub ingredients: Vec<Value>,
}

fn no_heating_start() -> i64 {
    -1
}

/// A skipped document and the reason it could not be restored.
#[derive(Debug, Clone)]
pub struct DecodeFailure {
    pub world: WorldId,
    pub pos: BlockPos,
    pub reason: String,
}

/// Result of decoding a persisted batch.
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub cauldrons: Vec<Cauldron>,
    /// Documents silently dropped because their container no longer exists.
    pub dropped_missing: usize,
    pub failures: Vec<DecodeFailure>,
}

/// Serialize one cauldron to its document form.
pub fn encode(cauldron: &Cauldron) -> CauldronDoc {
    CauldronDoc {
        world: cauldron.world().clone(),
        cauldron: cauldron.pos(),
        heating_start_time: cauldron
            .heating_started()
            .map_or(-1, |t| i64::try_from(t).unwrap_or(i64::MAX)),
        heating_up: cauldron.heat() == HeatState::HeatingUp,
        bubbling: cauldron.heat() == HeatState::Bubbling,
        ingredients: cauldron
            .basket()
            .iter()
            .map(|entry| entry.to_document())
            .collect(),
    }
}

/// Serialize every live cauldron, in iteration order.
pub fn encode_all(registry: &CauldronRegistry) -> Vec<CauldronDoc> {
    registry.iter().map(|(_, c)| encode(c)).collect()
}

/// Serialize the whole collection to the on-disk JSON string.
pub fn to_json_string(registry: &CauldronRegistry) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(&encode_all(registry))?)
}

/// Rebuild one cauldron from its document.
fn decode_one(
    doc: &CauldronDoc,
    recipes: &RecipeRegistry,
    cfg: &CauldronConfig,
) -> Result<Cauldron, String> {
    let (heat, heating_started) = if doc.bubbling {
        (HeatState::Bubbling, None)
    } else if doc.heating_up {
        if doc.heating_start_time < 0 {
            return Err("heatingUp without heatingStartTime".to_string());
        }
        (HeatState::HeatingUp, Some(doc.heating_start_time as u64))
    } else {
        (HeatState::Unheated, None)
    };

    let mut basket = Basket::new();
    for ingredient in &doc.ingredients {
        let variant = recipes
            .decode_variant(ingredient)
            .map_err(|e| e.to_string())?;
        basket.add(variant);
    }

    Ok(Cauldron::restore(
        doc.world.clone(),
        doc.cauldron,
        cfg.consume_radius,
        heat,
        heating_started,
        basket,
    ))
}

/// Rebuild a batch of cauldrons, skipping missing containers silently and
/// malformed documents with a failure record.
pub fn decode_all(
    docs: &[CauldronDoc],
    recipes: &RecipeRegistry,
    cfg: &CauldronConfig,
    host: &mut dyn Host,
) -> DecodeReport {
    let mut report = DecodeReport::default();
    for doc in docs {
        if !host.cauldron_exists(&doc.world, doc.cauldron) {
            report.dropped_missing += 1;
            continue;
        }
        match decode_one(doc, recipes, cfg) {
            Ok(cauldron) => report.cauldrons.push(cauldron),
            Err(reason) => report.failures.push(DecodeFailure {
                world: doc.world.clone(),
                pos: doc.cauldron,
                reason,
            }),
        }
    }
    report
}

/// Parse the on-disk JSON string and rebuild the batch.
pub fn from_json_str(
    json: &str,
    recipes: &RecipeRegistry,
    cfg: &CauldronConfig,
    host: &mut dyn Host,
) -> Result<DecodeReport, PersistError> {
    let docs: Vec<CauldronDoc> = serde_json::from_str(json)?;
    Ok(decode_all(&docs, recipes, cfg, host))
}
