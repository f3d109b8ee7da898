//! The host collaborator interface and cancellable confirmation hooks.
//!
//! The core never dispatches through global event buses: every world query,
//! world effect, and confirmation gate is a synchronous call on a
//! host-provided [`Host`] object passed by reference into the tick. Each
//! confirmation is a single call/return exchange producing an [`Outcome`]
//! whose payload the host may have mutated; cancellation is first-class
//! control flow, not an error.

use crate::fixed::Fixed64;
use crate::id::{ActorId, BlockPos, EntityId, Key, Region, WorldId, WorldItemId};
use crate::ingredient::{IngredientVariant, WorldStack};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a confirmation hook: a cancelled flag plus the (possibly
/// host-mutated) payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub cancelled: bool,
    pub payload: T,
}

impl<T> Outcome<T> {
    /// Confirm with the given payload.
    pub fn allow(payload: T) -> Self {
        Self {
            cancelled: false,
            payload,
        }
    }

    /// Veto, returning the payload unchanged (or mutated, for hooks whose
    /// cancellation still carries meaning, like a forced drop).
    pub fn cancel(payload: T) -> Self {
        Self {
            cancelled: true,
            payload,
        }
    }

    pub fn allowed(&self) -> bool {
        !self.cancelled
    }
}

// ---------------------------------------------------------------------------
// Hook payloads
// ---------------------------------------------------------------------------

/// A cauldron that finished heating is about to start bubbling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginBubble {
    pub world: WorldId,
    pub pos: BlockPos,
}

/// A loose item is about to be consumed into the basket. The host may
/// substitute a different classification; cancellation does not block
/// consumption, only the substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientAdd {
    pub item: WorldItemId,
    pub actor: Option<ActorId>,
    pub variant: IngredientVariant,
}

/// A bubbling cauldron is about to damage a living entity inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CauldronDamage {
    pub target: EntityId,
    pub damage: Fixed64,
}

/// An entity died in the cauldron and is about to yield essence. The host
/// may override the amount, including to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathEssence {
    pub entity: Key,
    pub amount: u32,
}

/// A recipe matched and a result is about to be produced. The host may
/// override or null out the result and override the experience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCraft {
    pub recipe: Key,
    pub actor: Option<ActorId>,
    pub result: Option<WorldStack>,
    pub experience: u32,
}

/// The reason a basket is being flushed to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The heat source under the cauldron disappeared.
    LostHeat,
    /// The last-interacting actor lacked the recipe permission.
    NoPermission,
    /// The cauldron was removed from the world.
    Removed,
}

/// A basket is about to be dropped as world items. The host may remove
/// candidates from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientsDrop {
    pub reason: DropReason,
    pub actor: Option<ActorId>,
    pub items: Vec<WorldStack>,
}

// ---------------------------------------------------------------------------
// World query/effect types
// ---------------------------------------------------------------------------

/// Water level of the cauldron container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillLevel {
    Empty,
    Partial,
    Full,
}

/// A loose item found in the consumption region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseItem {
    pub id: WorldItemId,
    pub stack: WorldStack,
    /// Actor that threw/spawned the item, if recorded.
    pub origin: Option<ActorId>,
    /// Set on items a cauldron itself produced; such items are never
    /// re-consumed.
    pub from_craft: bool,
}

/// A living entity found in the consumption region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivingEntity {
    pub id: EntityId,
}

/// Result of applying cauldron damage to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageDealt {
    pub died: bool,
    /// Entity kind eligible for essence extraction, reported by the host
    /// when the damage killed the target.
    pub essence_source: Option<Key>,
}

/// Initial velocity for a spawned craft result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub x: Fixed64,
    pub y: Fixed64,
    pub z: Fixed64,
}

// ---------------------------------------------------------------------------
// Host trait
// ---------------------------------------------------------------------------

/// Everything the simulation core requires from its surrounding game host.
///
/// All calls are synchronous and run on the scheduler's logical thread; a
/// hook that never returns blocks the scheduler, so hooks must be fast.
pub trait Host {
    // -- World queries --

    /// Does a structurally valid cauldron container exist at this position?
    fn cauldron_exists(&mut self, world: &WorldId, pos: BlockPos) -> bool;

    /// Is the heat-source precondition satisfied (lit fire, lava, ...)?
    fn heat_source_valid(&mut self, world: &WorldId, pos: BlockPos) -> bool;

    /// Water level of the container.
    fn fill_level(&mut self, world: &WorldId, pos: BlockPos) -> FillLevel;

    /// Loose items currently inside the region.
    fn loose_items_in(&mut self, world: &WorldId, region: Region) -> Vec<LooseItem>;

    /// Living entities currently inside the region.
    fn living_in(&mut self, world: &WorldId, region: Region) -> Vec<LivingEntity>;

    // -- World effects --

    /// Remove a loose item from the world (it has been consumed).
    fn destroy_item(&mut self, item: WorldItemId);

    /// Spawn a craft result above the cauldron. `from_craft` tags the item
    /// so ingestion skips it.
    fn spawn_result(
        &mut self,
        world: &WorldId,
        pos: BlockPos,
        stack: WorldStack,
        velocity: Velocity,
        from_craft: bool,
    );

    /// Spawn an experience reward at the cauldron.
    fn spawn_experience(&mut self, world: &WorldId, pos: BlockPos, amount: u32);

    /// Place dropped basket contents into the world at the cauldron.
    fn place_dropped_items(&mut self, world: &WorldId, pos: BlockPos, items: Vec<WorldStack>);

    /// Ambient bubbling particles/sound at the given volume.
    fn ambient_effects(&mut self, world: &WorldId, pos: BlockPos, volume: Fixed64);

    /// Apply damage to an entity, reporting death and essence eligibility.
    fn damage_entity(&mut self, target: EntityId, amount: Fixed64) -> DamageDealt;

    // -- Actors --

    fn actor_online(&mut self, actor: ActorId) -> bool;

    fn has_permission(&mut self, actor: ActorId, permission: &Key) -> bool;

    // -- Confirmation hooks --

    fn confirm_begin_bubble(&mut self, payload: BeginBubble) -> Outcome<BeginBubble>;

    fn confirm_ingredient_add(&mut self, payload: IngredientAdd) -> Outcome<IngredientAdd>;

    fn confirm_cauldron_damage(&mut self, payload: CauldronDamage) -> Outcome<CauldronDamage>;

    fn confirm_death_essence(&mut self, payload: DeathEssence) -> Outcome<DeathEssence>;

    fn confirm_item_craft(&mut self, payload: ItemCraft) -> Outcome<ItemCraft>;

    fn confirm_ingredients_drop(&mut self, payload: IngredientsDrop) -> Outcome<IngredientsDrop>;
}
