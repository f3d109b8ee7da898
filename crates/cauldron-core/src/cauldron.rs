//! The cauldron state machine: heating, bubbling, ingestion, and crafting.
//!
//! A [`Cauldron`] owns one basket, its heat state and timer, and the stable
//! id of the last interacting actor. [`Cauldron::update`] advances it by one
//! tick through a strictly ordered sequence of steps; every externally
//! observable step is gated through a host confirmation hook, and a veto at
//! any gate leaves the cauldron consistent for the next tick.

use crate::config::CauldronConfig;
use crate::fixed::{Fixed64, Ticks};
use crate::host::{
    BeginBubble, CauldronDamage, DeathEssence, DropReason, FillLevel, Host, IngredientAdd,
    IngredientsDrop, ItemCraft, Velocity,
};
use crate::id::{ActorId, BlockPos, Region, WorldId};
use crate::ingredient::{Basket, IngredientError, IngredientVariant, WorldStack};
use crate::registry::RecipeRegistry;
use crate::rng::SimRng;

/// Heat state of a cauldron. There is no terminal state; removal happens
/// externally through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatState {
    Unheated,
    HeatingUp,
    Bubbling,
}

/// What the scheduler should do with the cauldron after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Retained,
    /// The container no longer exists; defer-remove after the iteration.
    Removed,
}

/// One stateful reactor, keyed by world and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Cauldron {
    world: WorldId,
    pos: BlockPos,
    heat: HeatState,
    /// Tick at which heating began. Only meaningful while `HeatingUp`.
    heating_started: Option<Ticks>,
    basket: Basket,
    /// Stable id of the last interacting actor; resolved through the host
    /// whenever a live handle is needed.
    last_actor: Option<ActorId>,
    /// Cached consumption region around the container.
    region: Region,
}

impl Cauldron {
    pub fn new(world: WorldId, pos: BlockPos, consume_radius: u8) -> Self {
        Self {
            world,
            pos,
            heat: HeatState::Unheated,
            heating_started: None,
            basket: Basket::new(),
            last_actor: None,
            region: Region::around(pos, consume_radius),
        }
    }

    /// Rebuild a cauldron from persisted state. Used by the persistence
    /// codec.
    pub fn restore(
        world: WorldId,
        pos: BlockPos,
        consume_radius: u8,
        heat: HeatState,
        heating_started: Option<Ticks>,
        basket: Basket,
    ) -> Self {
        Self {
            world,
            pos,
            heat,
            heating_started,
            basket,
            last_actor: None,
            region: Region::around(pos, consume_radius),
        }
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn heat(&self) -> HeatState {
        self.heat
    }

    pub fn heating_started(&self) -> Option<Ticks> {
        self.heating_started
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    pub fn last_actor(&self) -> Option<ActorId> {
        self.last_actor
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Direct basket access for tests and host tooling.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn basket_mut(&mut self) -> &mut Basket {
        &mut self.basket
    }

    /// Advance this cauldron by one tick.
    ///
    /// Step order is load-bearing:
    ///
    /// 1. A cauldron mid-heat-up does nothing else this tick.
    /// 2. A cauldron that finished heating asks the host to begin bubbling;
    ///    a veto leaves it `HeatingUp`.
    /// 3. Losing the heat source drops the basket and resets to `Unheated`
    ///    before step 4 can restart heating in the same tick.
    /// 4. An unheated cauldron may begin heating only when full and heated.
    /// 5. Only a bubbling cauldron emits effects, ingests ingredients,
    ///    damages entities, and crafts.
    pub fn update(
        &mut self,
        tick: Ticks,
        cfg: &CauldronConfig,
        host: &mut dyn Host,
        recipes: &RecipeRegistry,
        rng: &mut SimRng,
    ) -> UpdateOutcome {
        if !host.cauldron_exists(&self.world, self.pos) {
            return UpdateOutcome::Removed;
        }

        if self.heat == HeatState::HeatingUp {
            let started = self.heating_started.unwrap_or(tick);
            if tick.saturating_sub(started) < cfg.heat_up_ticks {
                return UpdateOutcome::Retained;
            }
            let reply = host.confirm_begin_bubble(BeginBubble {
                world: self.world.clone(),
                pos: self.pos,
            });
            if reply.cancelled {
                return UpdateOutcome::Retained;
            }
            self.heat = HeatState::Bubbling;
            self.heating_started = None;
        }

        if matches!(self.heat, HeatState::Bubbling | HeatState::HeatingUp)
            && !host.heat_source_valid(&self.world, self.pos)
        {
            self.heat = HeatState::Unheated;
            self.heating_started = None;
            let actor = self.last_actor;
            self.drop_ingredients(host, DropReason::LostHeat, actor, false);
            return UpdateOutcome::Retained;
        }

        if self.heat == HeatState::Unheated {
            if host.fill_level(&self.world, self.pos) == FillLevel::Full
                && host.heat_source_valid(&self.world, self.pos)
            {
                self.heating_started = Some(tick);
                self.heat = HeatState::HeatingUp;
            }
            return UpdateOutcome::Retained;
        }

        // Bubbling from here on.
        if tick % cfg.effect_interval_ticks == 0 {
            host.ambient_effects(&self.world, self.pos, cfg.sound_volume);
        }
        if tick % cfg.sample_interval_ticks != 0 {
            return UpdateOutcome::Retained;
        }
        self.ingest_items(cfg, host);
        self.damage_entities(tick, cfg, host, rng);
        self.try_craft(host, recipes, rng);
        UpdateOutcome::Retained
    }

    /// Consume loose items found in the region into the basket.
    fn ingest_items(&mut self, cfg: &CauldronConfig, host: &mut dyn Host) {
        for item in host.loose_items_in(&self.world, self.region) {
            if item.from_craft {
                continue;
            }
            if cfg.require_player_source && item.origin.is_none() {
                continue;
            }
            if let Some(actor) = item.origin {
                if host.actor_online(actor) && !host.has_permission(actor, &cfg.base_permission) {
                    continue;
                }
                self.last_actor = Some(actor);
            }
            let Ok(variant) = classify(&item.stack) else {
                continue;
            };
            // The hook may substitute a different classification. A veto
            // only discards the substitution; the item is consumed either
            // way.
            let reply = host.confirm_ingredient_add(IngredientAdd {
                item: item.id,
                actor: item.origin,
                variant: variant.clone(),
            });
            let variant = if reply.allowed() && reply.payload.variant.amount() > 0 {
                reply.payload.variant
            } else {
                variant
            };
            self.basket.add(variant);
            host.destroy_item(item.id);
        }
    }

    /// Damage living entities in the region on the coarse damage interval,
    /// extracting essence from eligible deaths.
    fn damage_entities(
        &mut self,
        tick: Ticks,
        cfg: &CauldronConfig,
        host: &mut dyn Host,
        rng: &mut SimRng,
    ) {
        if !cfg.damage_enabled || tick % cfg.damage_interval_ticks != 0 {
            return;
        }
        for entity in host.living_in(&self.world, self.region) {
            let reply = host.confirm_cauldron_damage(CauldronDamage {
                target: entity.id,
                damage: cfg.damage_amount,
            });
            if reply.cancelled || reply.payload.damage <= Fixed64::ZERO {
                continue;
            }
            let dealt = host.damage_entity(entity.id, reply.payload.damage);
            if !dealt.died {
                continue;
            }
            let Some(kind) = dealt.essence_source else {
                continue;
            };
            let amount = rng.range_u32(cfg.essence_min, cfg.essence_max);
            let reply = host.confirm_death_essence(DeathEssence {
                entity: kind,
                amount,
            });
            if reply.cancelled {
                continue;
            }
            if let Ok(essence) =
                IngredientVariant::essence(reply.payload.entity, reply.payload.amount)
            {
                self.basket.add(essence);
            }
        }
    }

    /// Attempt one craft against the recipe registry.
    ///
    /// At most one result is produced per tick: the scarcity yield is only
    /// the >= 1 gate inside [`RecipeRegistry::applicable_recipe`], never a
    /// batch multiplier.
    fn try_craft(&mut self, host: &mut dyn Host, recipes: &RecipeRegistry, rng: &mut SimRng) {
        let Some(recipe) = recipes.applicable_recipe(&self.basket) else {
            return;
        };
        if let Some(actor) = self.last_actor {
            if !host.has_permission(actor, recipe.permission()) {
                self.drop_ingredients(host, DropReason::NoPermission, Some(actor), false);
                return;
            }
        }
        let reply = host.confirm_item_craft(ItemCraft {
            recipe: recipe.id().clone(),
            actor: self.last_actor,
            result: Some(recipe.result().clone()),
            experience: recipe.experience(),
        });
        if reply.cancelled {
            // Ingredients remain; the recipe is re-evaluated next sampling
            // tick.
            return;
        }
        let ItemCraft {
            result, experience, ..
        } = reply.payload;
        if let Some(stack) = result {
            host.spawn_result(
                &self.world,
                self.pos,
                stack,
                result_velocity(rng),
                true,
            );
        }
        if experience > 0 {
            host.spawn_experience(&self.world, self.pos, experience);
        }
        // Second scan: re-match every requirement by similarity. The craft
        // hook may be arbitrarily slow or re-entrant, so entry references
        // from the yield computation are never reused.
        for req in recipe.ingredients() {
            self.basket.consume(req, req.amount(), recipes.categories());
        }
    }

    /// Flush the basket to the world as dropped items.
    ///
    /// Returns true on success (including an already-empty basket). A vetoed
    /// drop with `force == false` discards nothing: the candidates are never
    /// placed and the basket is left untouched for the caller.
    pub fn drop_ingredients(
        &mut self,
        host: &mut dyn Host,
        reason: DropReason,
        actor: Option<ActorId>,
        force: bool,
    ) -> bool {
        if self.basket.is_empty() {
            return true;
        }
        let candidates = self.basket.world_items();
        let reply = host.confirm_ingredients_drop(IngredientsDrop {
            reason,
            actor,
            items: candidates,
        });
        if reply.cancelled && !force {
            return false;
        }
        // Candidates the hook removed from the list are simply never placed.
        host.place_dropped_items(&self.world, self.pos, reply.payload.items);
        self.basket.clear();
        true
    }
}

/// Classify a world item stack into an ingredient variant. Essence-vial
/// classification takes priority over generic item classification.
fn classify(stack: &WorldStack) -> Result<IngredientVariant, IngredientError> {
    match &stack.essence_of {
        Some(entity) => IngredientVariant::essence(entity.clone(), stack.amount),
        None => IngredientVariant::item(stack.item.clone(), stack.amount),
    }
}

fn result_velocity(rng: &mut SimRng) -> Velocity {
    let spread = Fixed64::from_num(0.05);
    Velocity {
        x: rng.jitter(spread),
        y: Fixed64::from_num(0.2) + rng.jitter(spread),
        z: rng.jitter(spread),
    }
}
