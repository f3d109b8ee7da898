//! The update scheduler: one update per cauldron per tick.
//!
//! A single logical thread drives all cauldrons sequentially; basket
//! mutation, state transitions, and host hooks assume exclusive access
//! during a tick and never suspend. External add/remove triggered by host
//! events is queued as [`Command`]s and applied at the tick boundary, never
//! mid-iteration. Cauldrons found structurally invalid during the iteration
//! are buffered and removed after it completes.

use crate::cauldron::{Cauldron, UpdateOutcome};
use crate::collection::CauldronRegistry;
use crate::config::CauldronConfig;
use crate::fixed::Ticks;
use crate::host::{DropReason, Host};
use crate::id::{BlockPos, CauldronId, WorldId};
use crate::registry::RecipeRegistry;
use crate::rng::SimRng;

/// An externally submitted registry mutation, applied at the next tick
/// boundary.
#[derive(Debug)]
pub enum Command {
    /// A qualifying container was placed.
    Add(Cauldron),
    /// The container was broken or invalidated.
    Remove {
        world: WorldId,
        pos: BlockPos,
        /// Flush the basket to the world (forced; the drop hook cannot veto
        /// a removal).
        drop_contents: bool,
    },
}

/// Source the scheduler re-snapshots configuration from when flagged dirty.
pub trait ConfigSource {
    fn snapshot(&self) -> CauldronConfig;
}

/// Counters describing one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Cauldrons updated this tick.
    pub ticked: usize,
    /// Cauldrons removed (deferred structural removals).
    pub removed: usize,
    /// Commands that could not be applied (e.g. add at an occupied position).
    pub rejected_commands: usize,
}

/// Drives every live cauldron, one fixed-size step at a time.
#[derive(Debug)]
pub struct UpdateScheduler {
    cauldrons: CauldronRegistry,
    config: CauldronConfig,
    config_dirty: bool,
    pending: Vec<Command>,
    tick: Ticks,
    rng: SimRng,
}

impl UpdateScheduler {
    pub fn new(config: CauldronConfig, cauldrons: CauldronRegistry, seed: u64) -> Self {
        Self {
            cauldrons,
            config,
            config_dirty: false,
            pending: Vec::new(),
            tick: 0,
            rng: SimRng::new(seed),
        }
    }

    /// Queue a registry mutation for the next tick boundary.
    pub fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Host reload signal: re-snapshot configuration on the next tick, not
    /// immediately.
    pub fn mark_config_dirty(&mut self) {
        self.config_dirty = true;
    }

    pub fn current_tick(&self) -> Ticks {
        self.tick
    }

    pub fn config(&self) -> &CauldronConfig {
        &self.config
    }

    pub fn cauldrons(&self) -> &CauldronRegistry {
        &self.cauldrons
    }

    /// Hand the collection back for shutdown persistence. The scheduler must
    /// already be stopped; persistence never runs concurrently with ticking.
    pub fn into_cauldrons(self) -> CauldronRegistry {
        self.cauldrons
    }

    /// Run one tick: apply queued commands, refresh the config snapshot if
    /// dirty, update every cauldron, then apply deferred removals.
    pub fn tick(
        &mut self,
        host: &mut dyn Host,
        recipes: &RecipeRegistry,
        config_source: &dyn ConfigSource,
    ) -> TickReport {
        let mut report = TickReport::default();

        for command in self.pending.drain(..) {
            match command {
                Command::Add(cauldron) => {
                    if self.cauldrons.add(cauldron).is_err() {
                        report.rejected_commands += 1;
                    }
                }
                Command::Remove {
                    world,
                    pos,
                    drop_contents,
                } => match self.cauldrons.remove_at(&world, pos) {
                    Some(mut cauldron) => {
                        if drop_contents {
                            let actor = cauldron.last_actor();
                            cauldron.drop_ingredients(host, DropReason::Removed, actor, true);
                        }
                    }
                    None => report.rejected_commands += 1,
                },
            }
        }

        if self.config_dirty {
            self.config = config_source.snapshot();
            self.config_dirty = false;
        }

        let mut invalidated: Vec<CauldronId> = Vec::new();
        for (id, cauldron) in self.cauldrons.iter_mut() {
            report.ticked += 1;
            if cauldron.update(self.tick, &self.config, host, recipes, &mut self.rng)
                == UpdateOutcome::Removed
            {
                invalidated.push(id);
            }
        }

        for id in invalidated {
            if let Some(mut cauldron) = self.cauldrons.remove(id) {
                let actor = cauldron.last_actor();
                cauldron.drop_ingredients(host, DropReason::Removed, actor, true);
                report.removed += 1;
            }
        }

        self.tick += 1;
        report
    }
}
