//! Integration tests for the cauldron simulation core.
//!
//! These exercise end-to-end behavior: the heat state machine, ingredient
//! ingestion, crafting with confirmation hooks, the drop protocol, the
//! scheduler, and persistence round-trips.

use cauldron_core::cauldron::{Cauldron, HeatState, UpdateOutcome};
use cauldron_core::collection::CauldronRegistry;
use cauldron_core::config::CauldronConfig;
use cauldron_core::fixed::Ticks;
use cauldron_core::host::DropReason;
use cauldron_core::id::ActorId;
use cauldron_core::ingredient::{Basket, WorldStack};
use cauldron_core::persist;
use cauldron_core::registry::RecipeRegistry;
use cauldron_core::rng::SimRng;
use cauldron_core::scheduler::{Command, ConfigSource, UpdateScheduler};
use cauldron_core::test_utils::*;

/// Config with every interval at 1 so any tick samples, and a short heat-up.
fn fast_config() -> CauldronConfig {
    CauldronConfig {
        heat_up_ticks: 10,
        sample_interval_ticks: 1,
        effect_interval_ticks: 1,
        damage_interval_ticks: 1,
        ..CauldronConfig::default()
    }
}

fn tick(
    cauldron: &mut Cauldron,
    at: Ticks,
    cfg: &CauldronConfig,
    host: &mut ScriptedHost,
    recipes: &RecipeRegistry,
    rng: &mut SimRng,
) -> UpdateOutcome {
    cauldron.update(at, cfg, host, recipes, rng)
}

// ===========================================================================
// Scenario 1: heat-up progression
// ===========================================================================

#[test]
fn unheated_to_heating_to_bubbling() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::new(test_world(), test_pos(), 1);

    // Tick 0: full + heated, so heating starts with a timestamp.
    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(cauldron.heat(), HeatState::HeatingUp);
    assert_eq!(cauldron.heating_started(), Some(0));

    // Mid-heat ticks do nothing: no hooks, no effects, no state change.
    for at in 1..cfg.heat_up_ticks {
        tick(&mut cauldron, at, &cfg, &mut host, &recipes, &mut rng);
    }
    assert_eq!(cauldron.heat(), HeatState::HeatingUp);
    assert!(host.begin_bubble_confirms.is_empty());
    assert_eq!(host.effect_count, 0);

    // Heat-up duration elapsed: confirmed begin-bubble transitions.
    tick(
        &mut cauldron,
        cfg.heat_up_ticks,
        &cfg,
        &mut host,
        &recipes,
        &mut rng,
    );
    assert_eq!(cauldron.heat(), HeatState::Bubbling);
    assert_eq!(cauldron.heating_started(), None);
    assert_eq!(host.begin_bubble_confirms.len(), 1);
}

#[test]
fn vetoed_begin_bubble_stays_heating() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.cancel_begin_bubble = true;
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::new(test_world(), test_pos(), 1);

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    tick(
        &mut cauldron,
        cfg.heat_up_ticks,
        &cfg,
        &mut host,
        &recipes,
        &mut rng,
    );
    assert_eq!(cauldron.heat(), HeatState::HeatingUp);
    // Retried (and re-vetoed) on the following tick.
    tick(
        &mut cauldron,
        cfg.heat_up_ticks + 1,
        &cfg,
        &mut host,
        &recipes,
        &mut rng,
    );
    assert_eq!(host.begin_bubble_confirms.len(), 2);
}

#[test]
fn partial_fill_never_starts_heating() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.fill = cauldron_core::host::FillLevel::Partial;
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::new(test_world(), test_pos(), 1);

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(cauldron.heat(), HeatState::Unheated);
    assert_eq!(cauldron.heating_started(), None);
}

// ===========================================================================
// Heat loss
// ===========================================================================

#[test]
fn bubbling_cauldron_losing_heat_drops_basket() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        basket_of(&[(nether_wart(), 4), (spider_eye(), 2)]),
    );

    host.heat_valid = false;
    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    assert_eq!(cauldron.heat(), HeatState::Unheated);
    assert!(cauldron.basket().is_empty());
    assert_eq!(host.drop_confirms.len(), 1);
    assert_eq!(host.drop_confirms[0].reason, DropReason::LostHeat);
    assert_eq!(host.placed.len(), 1);
    assert_eq!(host.placed[0].len(), 2);
}

#[test]
fn heat_loss_does_not_restart_heating_same_tick() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.heat_valid = false;
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(cauldron.heat(), HeatState::Unheated);
    assert_eq!(cauldron.heating_started(), None);
}

#[test]
fn cancelled_lost_heat_drop_keeps_basket_contents() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.heat_valid = false;
    host.cancel_drop = true;
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        basket_of(&[(nether_wart(), 4)]),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    // State still resets, but nothing is placed and the basket survives.
    assert_eq!(cauldron.heat(), HeatState::Unheated);
    assert_eq!(cauldron.basket().len(), 1);
    assert!(host.placed.is_empty());
}

// ===========================================================================
// Ingestion
// ===========================================================================

#[test]
fn loose_items_are_classified_merged_and_destroyed() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    let actor = ActorId(9);
    host.items = vec![
        loose(1, WorldStack::new(nether_wart(), 2), Some(actor)),
        loose(2, WorldStack::new(nether_wart(), 3), None),
    ];
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    assert_eq!(cauldron.basket().entries(), &[item(nether_wart(), 5)]);
    assert_eq!(host.destroyed.len(), 2);
    assert_eq!(host.add_confirms.len(), 2);
    assert_eq!(cauldron.last_actor(), Some(actor));
}

#[test]
fn craft_tagged_items_are_skipped() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    let mut produced = loose(1, WorldStack::new(potion(), 1), None);
    produced.from_craft = true;
    host.items = vec![produced];
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert!(cauldron.basket().is_empty());
    assert!(host.destroyed.is_empty());
}

#[test]
fn player_source_requirement_skips_orphan_items() {
    let cfg = CauldronConfig {
        require_player_source: true,
        ..fast_config()
    };
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.items = vec![loose(1, WorldStack::new(nether_wart(), 2), None)];
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert!(cauldron.basket().is_empty());
}

#[test]
fn online_actor_without_base_permission_is_skipped() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    let actor = ActorId(4);
    host.online.insert(actor);
    host.deny(actor, cfg.base_permission.clone());
    host.items = vec![loose(1, WorldStack::new(nether_wart(), 2), Some(actor))];
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert!(cauldron.basket().is_empty());
    assert_eq!(cauldron.last_actor(), None);
}

#[test]
fn hook_substitution_enriches_classification() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.substitute_variant = Some(essence(zombie(), 2));
    host.items = vec![loose(1, WorldStack::new(nether_wart(), 2), None)];
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(cauldron.basket().entries(), &[essence(zombie(), 2)]);
}

#[test]
fn cancelled_add_hook_still_consumes_with_original_classification() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.cancel_ingredient_add = true;
    host.substitute_variant = Some(essence(zombie(), 2));
    host.items = vec![loose(1, WorldStack::new(nether_wart(), 2), None)];
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(cauldron.basket().entries(), &[item(nether_wart(), 2)]);
    assert_eq!(host.destroyed.len(), 1);
}

// ===========================================================================
// Entity damage and essence
// ===========================================================================

#[test]
fn death_essence_lands_in_basket_within_configured_range() {
    let cfg = CauldronConfig {
        essence_min: 2,
        essence_max: 4,
        ..fast_config()
    };
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.living = vec![cauldron_core::host::LivingEntity {
        id: cauldron_core::id::EntityId(5),
    }];
    host.damage_outcome = cauldron_core::host::DamageDealt {
        died: true,
        essence_source: Some(zombie()),
    };
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    assert_eq!(host.damaged.len(), 1);
    assert_eq!(host.essence_confirms.len(), 1);
    assert_eq!(cauldron.basket().len(), 1);
    let amount = cauldron.basket().entries()[0].amount();
    assert!((2..=4).contains(&amount));
}

#[test]
fn essence_override_to_zero_adds_nothing() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.living = vec![cauldron_core::host::LivingEntity {
        id: cauldron_core::id::EntityId(5),
    }];
    host.damage_outcome = cauldron_core::host::DamageDealt {
        died: true,
        essence_source: Some(zombie()),
    };
    host.override_essence_amount = Some(0);
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert!(cauldron.basket().is_empty());
}

#[test]
fn cancelled_damage_hook_spares_the_entity() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.living = vec![cauldron_core::host::LivingEntity {
        id: cauldron_core::id::EntityId(5),
    }];
    host.cancel_damage = true;
    let mut rng = SimRng::new(1);
    let mut cauldron = Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        Basket::new(),
    );

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(host.damage_confirms.len(), 1);
    assert!(host.damaged.is_empty());
}

// ===========================================================================
// Scenario 2/3: crafting
// ===========================================================================

fn bubbling_with(basket: Basket) -> Cauldron {
    Cauldron::restore(
        test_world(),
        test_pos(),
        1,
        HeatState::Bubbling,
        None,
        basket,
    )
}

#[test]
fn confirmed_craft_emits_once_and_consumes_ingredients() {
    let cfg = fast_config();
    let mut recipes = RecipeRegistry::new();
    recipes
        .register(make_recipe(
            "test:brew",
            &[(nether_wart(), 2), (spider_eye(), 1)],
            5,
        ))
        .unwrap();
    let mut host = ScriptedHost::new();
    let mut rng = SimRng::new(1);
    let mut cauldron = bubbling_with(basket_of(&[(nether_wart(), 5), (spider_eye(), 2)]));

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    // Exactly one result regardless of the computed yield (2).
    assert_eq!(host.spawned.len(), 1);
    let (stack, _, from_craft) = &host.spawned[0];
    assert_eq!(stack, &WorldStack::new(potion(), 1));
    assert!(*from_craft);
    assert_eq!(host.experience_spawned, vec![5]);
    assert_eq!(
        cauldron.basket().entries(),
        &[item(nether_wart(), 3), item(spider_eye(), 1)]
    );
    assert_eq!(cauldron.heat(), HeatState::Bubbling);
}

#[test]
fn cancelled_craft_leaves_basket_and_retries_next_sample() {
    let cfg = fast_config();
    let mut recipes = RecipeRegistry::new();
    recipes
        .register(make_recipe(
            "test:brew",
            &[(nether_wart(), 2), (spider_eye(), 1)],
            0,
        ))
        .unwrap();
    let mut host = ScriptedHost::new();
    host.cancel_craft = true;
    let mut rng = SimRng::new(1);
    let mut cauldron = bubbling_with(basket_of(&[(nether_wart(), 5), (spider_eye(), 2)]));

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);
    assert!(host.spawned.is_empty());
    assert_eq!(cauldron.basket().entries()[0].amount(), 5);

    tick(&mut cauldron, 1, &cfg, &mut host, &recipes, &mut rng);
    assert_eq!(host.craft_confirms.len(), 2);
}

#[test]
fn craft_result_override_and_null_out() {
    let cfg = fast_config();
    let mut recipes = RecipeRegistry::new();
    recipes
        .register(make_recipe(
            "test:brew",
            &[(nether_wart(), 2), (spider_eye(), 1)],
            3,
        ))
        .unwrap();
    let mut host = ScriptedHost::new();
    host.override_result = Some(None);
    host.override_experience = Some(0);
    let mut rng = SimRng::new(1);
    let mut cauldron = bubbling_with(basket_of(&[(nether_wart(), 2), (spider_eye(), 1)]));

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    // Hook nulled the payload: nothing spawns, but ingredients are consumed.
    assert!(host.spawned.is_empty());
    assert!(host.experience_spawned.is_empty());
    assert!(cauldron.basket().is_empty());
}

#[test]
fn missing_recipe_permission_drops_basket_with_attribution() {
    let cfg = fast_config();
    let mut recipes = RecipeRegistry::new();
    let recipe = make_recipe("test:brew", &[(nether_wart(), 2), (spider_eye(), 1)], 0);
    let permission = recipe.permission().clone();
    recipes.register(recipe).unwrap();

    let actor = ActorId(3);
    let mut host = ScriptedHost::new();
    host.deny(actor, permission);
    // Actor throws an ingredient in, becoming the last interacting actor.
    host.items = vec![loose(1, WorldStack::new(spider_eye(), 1), Some(actor))];
    let mut rng = SimRng::new(1);
    let mut cauldron = bubbling_with(basket_of(&[(nether_wart(), 2)]));

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    assert!(host.spawned.is_empty());
    assert_eq!(host.drop_confirms.len(), 1);
    assert_eq!(host.drop_confirms[0].reason, DropReason::NoPermission);
    assert_eq!(host.drop_confirms[0].actor, Some(actor));
    assert!(cauldron.basket().is_empty());
}

#[test]
fn drop_hook_can_withhold_individual_items() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.heat_valid = false;
    host.truncate_drop_to = Some(1);
    let mut rng = SimRng::new(1);
    let mut cauldron = bubbling_with(basket_of(&[(nether_wart(), 4), (spider_eye(), 2)]));

    tick(&mut cauldron, 0, &cfg, &mut host, &recipes, &mut rng);

    // Only the surviving candidate is placed; the basket still clears.
    assert_eq!(host.placed.len(), 1);
    assert_eq!(host.placed[0], vec![WorldStack::new(nether_wart(), 4)]);
    assert!(cauldron.basket().is_empty());
}

// ===========================================================================
// Persistence round-trip
// ===========================================================================

#[test]
fn round_trip_preserves_state_timer_and_basket_order() {
    let cfg = CauldronConfig::default();
    let recipes = RecipeRegistry::new();
    let mut registry = CauldronRegistry::new();
    let mut basket = Basket::new();
    basket.add(item(nether_wart(), 7));
    basket.add(essence(zombie(), 3));
    basket.add(item(spider_eye(), 1));
    let original = Cauldron::restore(
        test_world(),
        test_pos(),
        cfg.consume_radius,
        HeatState::HeatingUp,
        Some(41),
        basket,
    );
    registry.add(original.clone()).unwrap();

    let json = persist::to_json_string(&registry).unwrap();
    let mut host = ScriptedHost::new();
    let report = persist::from_json_str(&json, &recipes, &cfg, &mut host).unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.dropped_missing, 0);
    assert_eq!(report.cauldrons.len(), 1);
    let restored = &report.cauldrons[0];
    assert_eq!(restored.heat(), HeatState::HeatingUp);
    assert_eq!(restored.heating_started(), Some(41));
    assert_eq!(restored.basket(), original.basket());
}

#[test]
fn bubbling_round_trip_has_no_timer() {
    let cfg = CauldronConfig::default();
    let recipes = RecipeRegistry::new();
    let mut registry = CauldronRegistry::new();
    registry
        .add(Cauldron::restore(
            test_world(),
            test_pos(),
            cfg.consume_radius,
            HeatState::Bubbling,
            None,
            basket_of(&[(nether_wart(), 1)]),
        ))
        .unwrap();

    let json = persist::to_json_string(&registry).unwrap();
    let mut host = ScriptedHost::new();
    let report = persist::from_json_str(&json, &recipes, &cfg, &mut host).unwrap();
    assert_eq!(report.cauldrons[0].heat(), HeatState::Bubbling);
    assert_eq!(report.cauldrons[0].heating_started(), None);
}

// ===========================================================================
// Scheduler end-to-end
// ===========================================================================

struct FixedSource(CauldronConfig);

impl ConfigSource for FixedSource {
    fn snapshot(&self) -> CauldronConfig {
        self.0.clone()
    }
}

#[test]
fn scheduler_drives_a_full_brew() {
    let cfg = CauldronConfig {
        heat_up_ticks: 3,
        sample_interval_ticks: 1,
        effect_interval_ticks: 1,
        damage_interval_ticks: 1,
        ..CauldronConfig::default()
    };
    let mut recipes = RecipeRegistry::new();
    recipes
        .register(make_recipe(
            "test:brew",
            &[(nether_wart(), 2), (spider_eye(), 1)],
            2,
        ))
        .unwrap();
    let mut host = ScriptedHost::new();
    let source = FixedSource(cfg.clone());
    let mut scheduler = UpdateScheduler::new(cfg, CauldronRegistry::new(), 7);
    scheduler.submit(Command::Add(Cauldron::new(test_world(), test_pos(), 1)));

    // Tick 0 applies the add and starts heating; ticks 1..3 heat; the
    // begin-bubble confirmation fires once the duration elapses.
    for _ in 0..5 {
        scheduler.tick(&mut host, &recipes, &source);
    }
    let cauldron = scheduler.cauldrons().at(&test_world(), test_pos()).unwrap();
    assert_eq!(cauldron.heat(), HeatState::Bubbling);

    // Feed it a full recipe's worth of loose items.
    host.items = vec![
        loose(1, WorldStack::new(nether_wart(), 2), None),
        loose(2, WorldStack::new(spider_eye(), 1), None),
    ];
    scheduler.tick(&mut host, &recipes, &source);

    assert_eq!(host.spawned.len(), 1);
    assert_eq!(host.experience_spawned, vec![2]);
    let cauldron = scheduler.cauldrons().at(&test_world(), test_pos()).unwrap();
    assert!(cauldron.basket().is_empty());
}

#[test]
fn scheduler_remove_command_force_drops_contents() {
    let cfg = fast_config();
    let recipes = RecipeRegistry::new();
    let mut host = ScriptedHost::new();
    host.cancel_drop = true; // removal drops are forced past the veto
    let source = FixedSource(cfg.clone());
    let mut cauldrons = CauldronRegistry::new();
    let mut cauldron = Cauldron::new(test_world(), test_pos(), 1);
    cauldron.basket_mut().add(item(nether_wart(), 3));
    cauldrons.add(cauldron).unwrap();
    let mut scheduler = UpdateScheduler::new(cfg, cauldrons, 7);

    scheduler.submit(Command::Remove {
        world: test_world(),
        pos: test_pos(),
        drop_contents: true,
    });
    scheduler.tick(&mut host, &recipes, &source);

    assert!(scheduler.cauldrons().is_empty());
    assert_eq!(host.placed.len(), 1);
}
