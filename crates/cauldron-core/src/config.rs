//! Tunable configuration consumed by the scheduler.
//!
//! A [`CauldronConfig`] is snapshotted once per reload signal rather than
//! re-read from backing storage every tick; see
//! [`UpdateScheduler::mark_config_dirty`](crate::scheduler::UpdateScheduler::mark_config_dirty).

use crate::fixed::{Fixed64, Ticks};
use crate::id::Key;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("interval '{0}' must be nonzero")]
    ZeroInterval(&'static str),
    #[error("essence range is inverted: min {0} > max {1}")]
    InvertedEssenceRange(u32, u32),
}

/// Snapshot of every tunable the tick loop reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CauldronConfig {
    /// Ticks a full, heated cauldron takes to start bubbling.
    pub heat_up_ticks: Ticks,
    /// Tick modulus for ingredient/entity region scans while bubbling.
    pub sample_interval_ticks: Ticks,
    /// Tick modulus for ambient bubbling effects.
    pub effect_interval_ticks: Ticks,
    /// Tick modulus for entity damage; coarser than the sample interval.
    pub damage_interval_ticks: Ticks,
    pub damage_enabled: bool,
    pub damage_amount: Fixed64,
    /// Inclusive range for randomly rolled death essence.
    pub essence_min: u32,
    pub essence_max: u32,
    /// When set, items with no recorded origin actor are never consumed.
    pub require_player_source: bool,
    /// Radius of the cube scanned for consumable items and entities.
    pub consume_radius: u8,
    /// Volume of ambient bubbling sounds.
    pub sound_volume: Fixed64,
    /// Base crafting permission checked before an actor's items are consumed.
    pub base_permission: Key,
}

impl Default for CauldronConfig {
    fn default() -> Self {
        Self {
            heat_up_ticks: 100,
            sample_interval_ticks: 4,
            effect_interval_ticks: 2,
            damage_interval_ticks: 20,
            damage_enabled: true,
            damage_amount: Fixed64::from_num(1),
            essence_min: 1,
            essence_max: 3,
            require_player_source: false,
            consume_radius: 1,
            sound_volume: Fixed64::from_num(0.5),
            base_permission: Key::new("cauldron:craft").expect("builtin permission key"),
        }
    }
}

impl CauldronConfig {
    /// Validate interval and range constraints, consuming self.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.heat_up_ticks == 0 {
            return Err(ConfigError::ZeroInterval("heat_up_ticks"));
        }
        if self.sample_interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval("sample_interval_ticks"));
        }
        if self.effect_interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval("effect_interval_ticks"));
        }
        if self.damage_interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval("damage_interval_ticks"));
        }
        if self.essence_min > self.essence_max {
            return Err(ConfigError::InvertedEssenceRange(
                self.essence_min,
                self.essence_max,
            ));
        }
        Ok(self)
    }
}
