//! Ingredient variants, the category index, and the cauldron basket.
//!
//! An [`IngredientVariant`] is a tagged-union classification of a consumable
//! unit. Variants carry a positive amount and support three operations:
//! similarity (equality ignoring amount), merge (sum amounts of similar
//! entries), and split (partial consumption). A [`Basket`] is the ordered,
//! merge-on-add collection of entries a cauldron holds.

use crate::id::Key;
use serde_json::{Map, Value, json};
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Type tags and constants
// ---------------------------------------------------------------------------

/// Wire type tag for [`IngredientVariant::Item`].
pub const TAG_ITEM: &str = "cauldron:item";
/// Wire type tag for [`IngredientVariant::Category`].
pub const TAG_CATEGORY: &str = "cauldron:item_category";
/// Wire type tag for [`IngredientVariant::Essence`].
pub const TAG_ESSENCE: &str = "cauldron:entity_essence";

/// Item key used for the world form of entity essence.
pub const ESSENCE_VIAL_ITEM: &str = "cauldron:essence_vial";

/// Maximum amount per world item stack when converting basket entries.
pub const MAX_STACK: u32 = 64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngredientError {
    #[error("ingredient amount must be a positive integer")]
    ZeroAmount,
}

// ---------------------------------------------------------------------------
// IngredientVariant
// ---------------------------------------------------------------------------

/// A tagged-union classification of a consumable unit.
///
/// The amount is always a positive integer: constructors reject zero, and
/// consumption deletes entries rather than leaving them at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientVariant {
    /// An opaque item type plus amount.
    Item { item: Key, amount: u32 },
    /// A coarse item category plus amount. As a recipe requirement this
    /// accepts any `Item` belonging to the category.
    Category { category: Key, amount: u32 },
    /// Essence extracted from a source entity kind.
    Essence { entity: Key, amount: u32 },
}

impl IngredientVariant {
    pub fn item(item: Key, amount: u32) -> Result<Self, IngredientError> {
        if amount == 0 {
            return Err(IngredientError::ZeroAmount);
        }
        Ok(Self::Item { item, amount })
    }

    pub fn category(category: Key, amount: u32) -> Result<Self, IngredientError> {
        if amount == 0 {
            return Err(IngredientError::ZeroAmount);
        }
        Ok(Self::Category { category, amount })
    }

    pub fn essence(entity: Key, amount: u32) -> Result<Self, IngredientError> {
        if amount == 0 {
            return Err(IngredientError::ZeroAmount);
        }
        Ok(Self::Essence { entity, amount })
    }

    pub fn amount(&self) -> u32 {
        match self {
            Self::Item { amount, .. }
            | Self::Category { amount, .. }
            | Self::Essence { amount, .. } => *amount,
        }
    }

    fn amount_mut(&mut self) -> &mut u32 {
        match self {
            Self::Item { amount, .. }
            | Self::Category { amount, .. }
            | Self::Essence { amount, .. } => amount,
        }
    }

    /// Variant-specific equality ignoring amount. Item entries compare item
    /// keys, category entries compare category keys, essence entries compare
    /// only the source entity kind.
    pub fn similar(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Item { item: a, .. }, Self::Item { item: b, .. }) => a == b,
            (Self::Category { category: a, .. }, Self::Category { category: b, .. }) => a == b,
            (Self::Essence { entity: a, .. }, Self::Essence { entity: b, .. }) => a == b,
            _ => false,
        }
    }

    /// As a recipe requirement: does `entry` satisfy this shape?
    ///
    /// Same as [`similar`](Self::similar), except a `Category` requirement
    /// additionally accepts any `Item` entry that belongs to the category.
    pub fn accepts(&self, entry: &Self, categories: &CategoryIndex) -> bool {
        if self.similar(entry) {
            return true;
        }
        match (self, entry) {
            (Self::Category { category, .. }, Self::Item { item, .. }) => {
                categories.contains(category, item)
            }
            _ => false,
        }
    }

    /// Merge a similar entry into this one, summing amounts.
    ///
    /// Panics if the entries are dissimilar: callers must only merge after a
    /// similarity check, so a dissimilar merge is a broken invariant in the
    /// core, not a runtime path.
    pub fn merge(&mut self, other: &Self) {
        assert!(
            self.similar(other),
            "merge of dissimilar ingredients: {self:?} and {other:?}"
        );
        *self.amount_mut() += other.amount();
    }

    /// Remove `delta` units from this entry, leaving the remainder.
    ///
    /// Panics unless `0 < delta < amount`: entries at or below the consumed
    /// amount are deleted by the basket, never retained at zero.
    pub fn split(&mut self, delta: u32) {
        let amount = self.amount_mut();
        assert!(
            delta > 0 && delta < *amount,
            "split delta {delta} out of range for amount {}",
            *amount
        );
        *amount -= delta;
    }

    /// The world item form(s) of this entry, in stacks of at most
    /// [`MAX_STACK`]. Essence converts to essence vial stacks tagged with
    /// the source entity kind. A category entry names no concrete item and
    /// yields no world items.
    pub fn world_items(&self) -> Vec<WorldStack> {
        let (item, essence_of) = match self {
            Self::Item { item, .. } => (item.clone(), None),
            Self::Category { .. } => return Vec::new(),
            Self::Essence { entity, .. } => (
                Key::new(ESSENCE_VIAL_ITEM).expect("vial key is well-formed"),
                Some(entity.clone()),
            ),
        };
        let mut remaining = self.amount();
        let mut stacks = Vec::new();
        while remaining > 0 {
            let n = remaining.min(MAX_STACK);
            stacks.push(WorldStack {
                item: item.clone(),
                amount: n,
                essence_of: essence_of.clone(),
            });
            remaining -= n;
        }
        stacks
    }

    /// Wire type tag for this variant.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Item { .. } => TAG_ITEM,
            Self::Category { .. } => TAG_CATEGORY,
            Self::Essence { .. } => TAG_ESSENCE,
        }
    }

    /// Serialize to the persisted document shape:
    /// `{"type": tag, <field>: key, "amount": n}`.
    pub fn to_document(&self) -> Value {
        match self {
            Self::Item { item, amount } => {
                json!({ "type": TAG_ITEM, "item": item, "amount": amount })
            }
            Self::Category { category, amount } => {
                json!({ "type": TAG_CATEGORY, "category": category, "amount": amount })
            }
            Self::Essence { entity, amount } => {
                json!({ "type": TAG_ESSENCE, "entity": entity, "amount": amount })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryIndex
// ---------------------------------------------------------------------------

/// Membership table from item category to item types.
///
/// Explicit owned state registered by the host at startup; there is no
/// implicit global tag table.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    members: HashMap<Key, BTreeSet<Key>>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, category: Key, item: Key) {
        self.members.entry(category).or_default().insert(item);
    }

    pub fn contains(&self, category: &Key, item: &Key) -> bool {
        self.members
            .get(category)
            .is_some_and(|set| set.contains(item))
    }
}

// ---------------------------------------------------------------------------
// WorldStack
// ---------------------------------------------------------------------------

/// A stack of items in world form, used for drops, craft results, and
/// loose-item classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldStack {
    pub item: Key,
    pub amount: u32,
    /// Set when the stack is an essence vial; carries the source entity kind.
    pub essence_of: Option<Key>,
}

impl WorldStack {
    pub fn new(item: Key, amount: u32) -> Self {
        Self {
            item,
            amount,
            essence_of: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Basket
// ---------------------------------------------------------------------------

/// The ordered collection of merged ingredient entries held by a cauldron.
///
/// Insertion order is first-seen order and is the tie-break for merge and
/// match lookups. Merge-on-add guarantees the basket never holds two
/// mutually-similar entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket {
    entries: Vec<IngredientVariant>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `variant` into the first similar entry, or append it.
    pub fn add(&mut self, variant: IngredientVariant) {
        match self.entries.iter_mut().find(|e| e.similar(&variant)) {
            Some(entry) => entry.merge(&variant),
            None => self.entries.push(variant),
        }
    }

    /// Consume `amount` units from the first entry accepted by `requirement`
    /// that holds at least `amount`. Entries consumed down to zero (or below)
    /// are deleted. Returns false if no entry satisfies the requirement.
    ///
    /// Re-matches by similarity on every call; callers must not reuse entry
    /// references across host confirmation hooks.
    pub fn consume(
        &mut self,
        requirement: &IngredientVariant,
        amount: u32,
        categories: &CategoryIndex,
    ) -> bool {
        let Some(idx) = self
            .entries
            .iter()
            .position(|e| requirement.accepts(e, categories) && e.amount() >= amount)
        else {
            return false;
        };
        if self.entries[idx].amount() <= amount {
            self.entries.remove(idx);
        } else {
            self.entries[idx].split(amount);
        }
        true
    }

    /// Convert every entry to its world item form(s), in basket order.
    pub fn world_items(&self) -> Vec<WorldStack> {
        self.entries.iter().flat_map(|e| e.world_items()).collect()
    }

    pub fn entries(&self) -> &[IngredientVariant] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &IngredientVariant> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Parse the `"amount"` field of a variant document, rejecting zero and
/// non-integer values. Shared by the built-in variant codecs.
pub(crate) fn document_amount(map: &Map<String, Value>) -> Option<u32> {
    let amount = map.get("amount")?.as_u64()?;
    u32::try_from(amount).ok().filter(|&a| a > 0)
}
