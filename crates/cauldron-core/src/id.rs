//! Identifier types for worlds, positions, actors, and namespaced keys.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a live cauldron in the [`CauldronRegistry`](crate::collection::CauldronRegistry).
    pub struct CauldronId;
}

/// A namespaced key of the form `namespace:path`.
///
/// Keys identify item types, item categories, entity kinds, permission tags,
/// recipe ids, and variant type tags. Both components must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Parse a `namespace:path` string into a key.
    pub fn new(s: &str) -> Result<Self, KeyError> {
        match s.split_once(':') {
            Some((ns, path)) if !ns.is_empty() && !path.is_empty() => Ok(Self(s.to_string())),
            _ => Err(KeyError::Malformed(s.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        // Constructor guarantees exactly one usable separator.
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or("")
    }

    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, p)| p).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, KeyError> {
        Key::new(&s)
    }
}

impl From<Key> for String {
    fn from(k: Key) -> String {
        k.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("malformed namespaced key: '{0}' (expected 'namespace:path')")]
    Malformed(String),
}

/// Opaque stable actor identifier.
///
/// Stored as the single source of truth for a cauldron's last-interacting
/// actor; live handles are resolved on demand through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Opaque world identifier (UUID-shaped string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub String);

/// Handle to a loose item entity owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldItemId(pub u64);

/// Handle to a living entity owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// A block position in a world. Registry key together with [`WorldId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// An axis-aligned block region, used for consumption scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Region {
    /// The cube of the given radius centered on `pos`.
    pub fn around(pos: BlockPos, radius: u8) -> Self {
        let r = radius as i32;
        Self {
            min: BlockPos::new(pos.x - r, pos.y - r, pos.z - r),
            max: BlockPos::new(pos.x + r, pos.y + r, pos.z + r),
        }
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }
}
