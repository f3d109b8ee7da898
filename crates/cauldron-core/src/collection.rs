//! The keyed collection of live cauldrons.
//!
//! Cauldrons are stored in a slotmap and indexed by `(world, position)`.
//! Insertion and removal happen only through explicit add/remove; there is
//! no implicit creation. The scheduler owns the collection exclusively
//! during the tick loop.

use crate::cauldron::Cauldron;
use crate::id::{BlockPos, CauldronId, WorldId};
use slotmap::SlotMap;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("a cauldron is already registered at {world:?} {pos:?}")]
    Occupied { world: WorldId, pos: BlockPos },
}

/// Live cauldrons keyed by spatial position.
#[derive(Debug, Default)]
pub struct CauldronRegistry {
    cauldrons: SlotMap<CauldronId, Cauldron>,
    by_pos: HashMap<(WorldId, BlockPos), CauldronId>,
}

impl CauldronRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cauldron. Positions are unique keys.
    pub fn add(&mut self, cauldron: Cauldron) -> Result<CauldronId, CollectionError> {
        let key = (cauldron.world().clone(), cauldron.pos());
        if self.by_pos.contains_key(&key) {
            return Err(CollectionError::Occupied {
                world: key.0,
                pos: key.1,
            });
        }
        let id = self.cauldrons.insert(cauldron);
        self.by_pos.insert(key, id);
        Ok(id)
    }

    /// Remove by id, returning the cauldron so its basket can be flushed.
    pub fn remove(&mut self, id: CauldronId) -> Option<Cauldron> {
        let cauldron = self.cauldrons.remove(id)?;
        self.by_pos
            .remove(&(cauldron.world().clone(), cauldron.pos()));
        Some(cauldron)
    }

    /// Remove by position, returning the cauldron.
    pub fn remove_at(&mut self, world: &WorldId, pos: BlockPos) -> Option<Cauldron> {
        let id = self.by_pos.remove(&(world.clone(), pos))?;
        self.cauldrons.remove(id)
    }

    pub fn get(&self, id: CauldronId) -> Option<&Cauldron> {
        self.cauldrons.get(id)
    }

    pub fn get_mut(&mut self, id: CauldronId) -> Option<&mut Cauldron> {
        self.cauldrons.get_mut(id)
    }

    pub fn at(&self, world: &WorldId, pos: BlockPos) -> Option<&Cauldron> {
        let id = self.by_pos.get(&(world.clone(), pos))?;
        self.cauldrons.get(*id)
    }

    pub fn at_mut(&mut self, world: &WorldId, pos: BlockPos) -> Option<&mut Cauldron> {
        let id = self.by_pos.get(&(world.clone(), pos))?;
        self.cauldrons.get_mut(*id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CauldronId, &Cauldron)> {
        self.cauldrons.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CauldronId, &mut Cauldron)> {
        self.cauldrons.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = CauldronId> + '_ {
        self.cauldrons.keys()
    }

    pub fn len(&self) -> usize {
        self.cauldrons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cauldrons.is_empty()
    }

    /// Drop every cauldron (shutdown path, after persistence flush).
    pub fn clear(&mut self) {
        self.cauldrons.clear();
        self.by_pos.clear();
    }
}
