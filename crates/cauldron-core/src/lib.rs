//! Cauldron Core -- the brewing-cauldron simulation engine.
//!
//! This crate provides the cauldron state machine, the ingredient basket
//! model, the recipe registry with scarcity-limited yield matching, the
//! tick scheduler, and the JSON persistence codec that a game host builds
//! its brewing feature on top of.
//!
//! # Tick Pipeline
//!
//! [`scheduler::UpdateScheduler::tick`] advances every live cauldron by one
//! discrete step:
//!
//! 1. **Commands** -- apply queued add/remove commands from host events.
//! 2. **Config** -- re-snapshot tunables if the host flagged them dirty.
//! 3. **Update** -- run each cauldron's state machine: heat-up guard,
//!    begin-bubble confirmation, heat-loss drop, heating start, and (while
//!    bubbling) ambient effects, ingredient ingestion, entity damage, and
//!    recipe crafting.
//! 4. **Removal** -- apply deferred removals for cauldrons whose container
//!    vanished mid-iteration.
//!
//! # Confirmation Hooks
//!
//! Every externally observable step (begin bubbling, ingredient add, entity
//! damage, death essence, item craft, ingredients drop) is gated through a
//! synchronous confirmation call on the host-provided [`host::Host`] trait.
//! A hook may veto the step or mutate its payload; the state machine handles
//! cancellation as first-class control flow at every call site.
//!
//! # Key Types
//!
//! - [`cauldron::Cauldron`] -- one reactor: heat state, timer, basket.
//! - [`ingredient::IngredientVariant`] -- tagged-union ingredient with
//!   similarity, merge, and split operations.
//! - [`ingredient::Basket`] -- ordered, merge-on-add ingredient collection.
//! - [`recipe::Recipe`] -- immutable requirements + result + experience.
//! - [`registry::RecipeRegistry`] -- insertion-ordered recipes, variant
//!   codecs, and category membership.
//! - [`collection::CauldronRegistry`] -- live cauldrons keyed by position.
//! - [`scheduler::UpdateScheduler`] -- drives one update per cauldron per
//!   tick with deferred removal.
//! - [`persist`] -- whole-file JSON document codec for cauldron state.

pub mod cauldron;
pub mod collection;
pub mod config;
pub mod fixed;
pub mod host;
pub mod id;
pub mod ingredient;
pub mod persist;
pub mod recipe;
pub mod registry;
pub mod rng;
pub mod scheduler;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
