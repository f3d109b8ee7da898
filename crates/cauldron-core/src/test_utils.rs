//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the helpers
//! are available to unit tests and, via the `test-utils` feature, to
//! integration tests in dependent crates.

use crate::fixed::Fixed64;
use crate::host::{
    BeginBubble, CauldronDamage, DamageDealt, DeathEssence, FillLevel, Host, IngredientAdd,
    IngredientsDrop, ItemCraft, LivingEntity, LooseItem, Outcome, Velocity,
};
use crate::id::{ActorId, BlockPos, EntityId, Key, Region, WorldId, WorldItemId};
use crate::ingredient::{Basket, IngredientVariant, WorldStack};
use crate::recipe::Recipe;
use std::collections::HashSet;

// ===========================================================================
// Keys
// ===========================================================================

pub fn key(s: &str) -> Key {
    Key::new(s).expect("well-formed test key")
}

pub fn nether_wart() -> Key {
    key("mc:nether_wart")
}
pub fn spider_eye() -> Key {
    key("mc:spider_eye")
}
pub fn glowstone() -> Key {
    key("mc:glowstone_dust")
}
pub fn potion() -> Key {
    key("mc:potion")
}
pub fn fungus_category() -> Key {
    key("mc:fungi")
}
pub fn zombie() -> Key {
    key("mc:zombie")
}
pub fn skeleton() -> Key {
    key("mc:skeleton")
}

pub fn test_world() -> WorldId {
    WorldId("0b5e9a7e-0000-4000-8000-000000000001".to_string())
}

pub fn test_pos() -> BlockPos {
    BlockPos::new(0, 64, 0)
}

// ===========================================================================
// Ingredient constructors
// ===========================================================================

pub fn item(item: Key, amount: u32) -> IngredientVariant {
    IngredientVariant::item(item, amount).expect("positive amount")
}

pub fn category(category: Key, amount: u32) -> IngredientVariant {
    IngredientVariant::category(category, amount).expect("positive amount")
}

pub fn essence(entity: Key, amount: u32) -> IngredientVariant {
    IngredientVariant::essence(entity, amount).expect("positive amount")
}

/// A basket of plain item entries, in order.
pub fn basket_of(entries: &[(Key, u32)]) -> Basket {
    let mut basket = Basket::new();
    for (key, amount) in entries {
        basket.add(item(key.clone(), *amount));
    }
    basket
}

/// A recipe of plain item requirements yielding one potion.
pub fn make_recipe(id: &str, requirements: &[(Key, u32)], experience: u32) -> Recipe {
    let mut builder = Recipe::builder(key(id), WorldStack::new(potion(), 1));
    for (req, amount) in requirements {
        builder = builder.ingredient(item(req.clone(), *amount));
    }
    builder.experience(experience).build().expect("valid recipe")
}

/// A loose world item with an origin actor.
pub fn loose(id: u64, stack: WorldStack, origin: Option<ActorId>) -> LooseItem {
    LooseItem {
        id: WorldItemId(id),
        stack,
        origin,
        from_craft: false,
    }
}

// ===========================================================================
// ScriptedHost
// ===========================================================================

/// A [`Host`] double with scripted answers and recorded effects.
///
/// Knob fields configure world state and hook replies; recording fields
/// capture every effect and confirmation the core issued.
#[derive(Debug)]
pub struct ScriptedHost {
    // -- World state knobs --
    pub exists: bool,
    pub heat_valid: bool,
    pub fill: FillLevel,
    /// Items returned (and drained) by the next region scan.
    pub items: Vec<LooseItem>,
    /// Living entities returned by every region scan.
    pub living: Vec<LivingEntity>,
    pub online: HashSet<ActorId>,
    pub denied_permissions: HashSet<(ActorId, Key)>,
    pub damage_outcome: DamageDealt,

    // -- Hook knobs --
    pub cancel_begin_bubble: bool,
    pub cancel_ingredient_add: bool,
    pub cancel_damage: bool,
    pub cancel_essence: bool,
    pub cancel_craft: bool,
    pub cancel_drop: bool,
    pub substitute_variant: Option<IngredientVariant>,
    pub override_essence_amount: Option<u32>,
    /// `Some(None)` nulls the result out entirely.
    pub override_result: Option<Option<WorldStack>>,
    pub override_experience: Option<u32>,
    /// Truncate the drop candidate list to this length in the hook reply.
    pub truncate_drop_to: Option<usize>,

    // -- Recordings --
    pub begin_bubble_confirms: Vec<BeginBubble>,
    pub add_confirms: Vec<IngredientAdd>,
    pub damage_confirms: Vec<CauldronDamage>,
    pub essence_confirms: Vec<DeathEssence>,
    pub craft_confirms: Vec<ItemCraft>,
    pub drop_confirms: Vec<IngredientsDrop>,
    pub destroyed: Vec<WorldItemId>,
    pub spawned: Vec<(WorldStack, Velocity, bool)>,
    pub experience_spawned: Vec<u32>,
    pub placed: Vec<Vec<WorldStack>>,
    pub damaged: Vec<(EntityId, Fixed64)>,
    pub effect_count: usize,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedHost {
    /// A host with a valid, full, heated container and no items or entities.
    pub fn new() -> Self {
        Self {
            exists: true,
            heat_valid: true,
            fill: FillLevel::Full,
            items: Vec::new(),
            living: Vec::new(),
            online: HashSet::new(),
            denied_permissions: HashSet::new(),
            damage_outcome: DamageDealt {
                died: false,
                essence_source: None,
            },
            cancel_begin_bubble: false,
            cancel_ingredient_add: false,
            cancel_damage: false,
            cancel_essence: false,
            cancel_craft: false,
            cancel_drop: false,
            substitute_variant: None,
            override_essence_amount: None,
            override_result: None,
            override_experience: None,
            truncate_drop_to: None,
            begin_bubble_confirms: Vec::new(),
            add_confirms: Vec::new(),
            damage_confirms: Vec::new(),
            essence_confirms: Vec::new(),
            craft_confirms: Vec::new(),
            drop_confirms: Vec::new(),
            destroyed: Vec::new(),
            spawned: Vec::new(),
            experience_spawned: Vec::new(),
            placed: Vec::new(),
            damaged: Vec::new(),
            effect_count: 0,
        }
    }

    pub fn deny(&mut self, actor: ActorId, permission: Key) {
        self.denied_permissions.insert((actor, permission));
    }
}

impl Host for ScriptedHost {
    fn cauldron_exists(&mut self, _world: &WorldId, _pos: BlockPos) -> bool {
        self.exists
    }

    fn heat_source_valid(&mut self, _world: &WorldId, _pos: BlockPos) -> bool {
        self.heat_valid
    }

    fn fill_level(&mut self, _world: &WorldId, _pos: BlockPos) -> FillLevel {
        self.fill
    }

    fn loose_items_in(&mut self, _world: &WorldId, _region: Region) -> Vec<LooseItem> {
        std::mem::take(&mut self.items)
    }

    fn living_in(&mut self, _world: &WorldId, _region: Region) -> Vec<LivingEntity> {
        self.living.clone()
    }

    fn destroy_item(&mut self, item: WorldItemId) {
        self.destroyed.push(item);
    }

    fn spawn_result(
        &mut self,
        _world: &WorldId,
        _pos: BlockPos,
        stack: WorldStack,
        velocity: Velocity,
        from_craft: bool,
    ) {
        self.spawned.push((stack, velocity, from_craft));
    }

    fn spawn_experience(&mut self, _world: &WorldId, _pos: BlockPos, amount: u32) {
        self.experience_spawned.push(amount);
    }

    fn place_dropped_items(&mut self, _world: &WorldId, _pos: BlockPos, items: Vec<WorldStack>) {
        self.placed.push(items);
    }

    fn ambient_effects(&mut self, _world: &WorldId, _pos: BlockPos, _volume: Fixed64) {
        self.effect_count += 1;
    }

    fn damage_entity(&mut self, target: EntityId, amount: Fixed64) -> DamageDealt {
        self.damaged.push((target, amount));
        self.damage_outcome.clone()
    }

    fn actor_online(&mut self, actor: ActorId) -> bool {
        self.online.contains(&actor)
    }

    fn has_permission(&mut self, actor: ActorId, permission: &Key) -> bool {
        !self
            .denied_permissions
            .contains(&(actor, permission.clone()))
    }

    fn confirm_begin_bubble(&mut self, payload: BeginBubble) -> Outcome<BeginBubble> {
        self.begin_bubble_confirms.push(payload.clone());
        if self.cancel_begin_bubble {
            Outcome::cancel(payload)
        } else {
            Outcome::allow(payload)
        }
    }

    fn confirm_ingredient_add(&mut self, mut payload: IngredientAdd) -> Outcome<IngredientAdd> {
        self.add_confirms.push(payload.clone());
        if let Some(variant) = &self.substitute_variant {
            payload.variant = variant.clone();
        }
        if self.cancel_ingredient_add {
            Outcome::cancel(payload)
        } else {
            Outcome::allow(payload)
        }
    }

    fn confirm_cauldron_damage(&mut self, payload: CauldronDamage) -> Outcome<CauldronDamage> {
        self.damage_confirms.push(payload);
        if self.cancel_damage {
            Outcome::cancel(payload)
        } else {
            Outcome::allow(payload)
        }
    }

    fn confirm_death_essence(&mut self, mut payload: DeathEssence) -> Outcome<DeathEssence> {
        self.essence_confirms.push(payload.clone());
        if let Some(amount) = self.override_essence_amount {
            payload.amount = amount;
        }
        if self.cancel_essence {
            Outcome::cancel(payload)
        } else {
            Outcome::allow(payload)
        }
    }

    fn confirm_item_craft(&mut self, mut payload: ItemCraft) -> Outcome<ItemCraft> {
        self.craft_confirms.push(payload.clone());
        if let Some(result) = &self.override_result {
            payload.result = result.clone();
        }
        if let Some(experience) = self.override_experience {
            payload.experience = experience;
        }
        if self.cancel_craft {
            Outcome::cancel(payload)
        } else {
            Outcome::allow(payload)
        }
    }

    fn confirm_ingredients_drop(&mut self, mut payload: IngredientsDrop) -> Outcome<IngredientsDrop> {
        self.drop_confirms.push(payload.clone());
        if let Some(keep) = self.truncate_drop_to {
            payload.items.truncate(keep);
        }
        if self.cancel_drop {
            Outcome::cancel(payload)
        } else {
            Outcome::allow(payload)
        }
    }
}
