//! Property-based tests for ingredient arithmetic and yield computation.
//!
//! Uses proptest to generate random ingredient entries, baskets, and
//! recipes, then verifies the merge/split/yield invariants hold.

use cauldron_core::id::Key;
use cauldron_core::ingredient::{Basket, CategoryIndex, IngredientVariant};
use cauldron_core::ingredient::{ESSENCE_VIAL_ITEM, MAX_STACK};
use cauldron_core::recipe::Recipe;
use cauldron_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// A small closed pool of keys so generated entries collide often.
fn arb_key() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(nether_wart()),
        Just(spider_eye()),
        Just(glowstone()),
        Just(zombie()),
        Just(skeleton()),
    ]
}

fn arb_variant(amount: impl Strategy<Value = u32>) -> impl Strategy<Value = IngredientVariant> {
    (0..3u8, arb_key(), amount).prop_map(|(kind, key, amount)| match kind {
        0 => item(key, amount),
        1 => category(key, amount),
        _ => essence(key, amount),
    })
}

// ===========================================================================
// Merge and split
// ===========================================================================

proptest! {
    #[test]
    fn merge_sums_amounts_and_stays_similar(
        variant in arb_variant(1..10_000u32),
        extra in 1..10_000u32,
    ) {
        let mut merged = variant.clone();
        let mut other = variant.clone();
        *match &mut other {
            IngredientVariant::Item { amount, .. }
            | IngredientVariant::Category { amount, .. }
            | IngredientVariant::Essence { amount, .. } => amount,
        } = extra;
        merged.merge(&other);
        prop_assert_eq!(merged.amount(), variant.amount() + extra);
        prop_assert!(merged.similar(&variant));
        prop_assert!(merged.similar(&other));
    }

    #[test]
    fn split_leaves_exact_remainder(
        variant in arb_variant(2..10_000u32),
        delta_seed in 1..10_000u32,
    ) {
        let mut entry = variant.clone();
        let delta = 1 + delta_seed % (variant.amount() - 1);
        entry.split(delta);
        prop_assert_eq!(entry.amount(), variant.amount() - delta);
        prop_assert!(entry.amount() > 0);
    }

    #[test]
    fn consume_at_or_above_amount_deletes_the_entry(
        variant in arb_variant(1..1_000u32),
    ) {
        let mut basket = Basket::new();
        basket.add(variant.clone());
        let cats = CategoryIndex::new();
        prop_assert!(basket.consume(&variant, variant.amount(), &cats));
        prop_assert!(basket.is_empty());
    }
}

// ===========================================================================
// Basket invariant
// ===========================================================================

proptest! {
    #[test]
    fn basket_never_holds_two_similar_entries(
        adds in proptest::collection::vec(arb_variant(1..100u32), 1..40),
    ) {
        let mut basket = Basket::new();
        let mut expected_total: u64 = 0;
        for variant in &adds {
            expected_total += variant.amount() as u64;
            basket.add(variant.clone());
        }
        for (i, a) in basket.entries().iter().enumerate() {
            for b in &basket.entries()[i + 1..] {
                prop_assert!(!a.similar(b));
            }
        }
        // Merging never loses or invents quantity.
        let total: u64 = basket.iter().map(|e| e.amount() as u64).sum();
        prop_assert_eq!(total, expected_total);
    }

    #[test]
    fn world_items_preserve_quantity_in_stack_chunks(
        entity in arb_key(),
        amount in 1..10_000u32,
    ) {
        let stacks = essence(entity, amount).world_items();
        let total: u32 = stacks.iter().map(|s| s.amount).sum();
        prop_assert_eq!(total, amount);
        prop_assert!(stacks.iter().all(|s| s.amount <= MAX_STACK && s.amount > 0));
        prop_assert!(stacks.iter().all(|s| s.item.as_str() == ESSENCE_VIAL_ITEM));
    }
}

// ===========================================================================
// Yield
// ===========================================================================

proptest! {
    /// With distinct item requirements, yield equals the minimum of the
    /// per-requirement integer ratios, or 0 when any is under-supplied.
    #[test]
    fn yield_matches_min_ratio_reference(
        required in proptest::collection::vec(1..20u32, 2..5),
        available in proptest::collection::vec(0..100u32, 2..5),
    ) {
        // Pair each requirement with an availability; distinct keys per slot.
        let n = required.len().min(available.len());
        let keys: Vec<Key> = (0..n)
            .map(|i| key(&format!("gen:ingredient_{i}")))
            .collect();

        let mut builder = Recipe::builder(key("gen:recipe"), potion_stack());
        for i in 0..n {
            builder = builder.ingredient(item(keys[i].clone(), required[i]));
        }
        // Recipes need two requirements minimum; n >= 2 by construction.
        let recipe = builder.build().unwrap();

        let mut basket = Basket::new();
        for i in 0..n {
            if available[i] > 0 {
                basket.add(item(keys[i].clone(), available[i]));
            }
        }

        let expected = (0..n)
            .map(|i| if available[i] >= required[i] { available[i] / required[i] } else { 0 })
            .min()
            .unwrap_or(0);
        prop_assert_eq!(recipe.yield_from(&basket, &CategoryIndex::new()), expected);
    }
}

fn potion_stack() -> cauldron_core::ingredient::WorldStack {
    cauldron_core::ingredient::WorldStack::new(potion(), 1)
}
