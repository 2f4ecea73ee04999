//! Identifiers for tiles, items and spawned nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of one spawned resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl InstanceId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Key of one tileset entry, conventionally `<tileset>:<local id>`
    ///
    /// The join key between raw tile metadata and a validated definition.
    TileId
}

string_id! {
    /// Inventory item name (`wood`, `carrot`, ...)
    ItemId
}

impl TileId {
    /// Tile id for entry `local` of `tileset`
    pub fn in_tileset(tileset: &str, local: u32) -> Self {
        Self(format!("{}:{}", tileset, local))
    }

    /// Split into tileset name and local tile number
    ///
    /// `None` for ids that do not follow the `<tileset>:<number>` form.
    pub fn tileset_entry(&self) -> Option<(&str, u32)> {
        let (tileset, local) = self.0.rsplit_once(':')?;
        if tileset.is_empty() {
            return None;
        }
        Some((tileset, local.parse().ok()?))
    }
}
