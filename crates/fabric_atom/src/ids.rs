//! Opaque ID newtypes for atom netlist entities.
//!
//! [`AtomBlockId`], [`AtomPortId`], [`AtomPinId`], and [`AtomNetId`] are
//! thin `u32` wrappers used as slot indices into the atom netlist store.
//! They are `Copy`, `Hash`, and `Serialize`/`Deserialize`. IDs never alias
//! across entity kinds and are never reused after removal.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a primitive block in the atom netlist.
    AtomBlockId
);

define_id!(
    /// Opaque, copyable ID for a port on an atom block.
    AtomPortId
);

define_id!(
    /// Opaque, copyable ID for a single pin of an atom port.
    AtomPinId
);

define_id!(
    /// Opaque, copyable ID for a net in the atom netlist.
    AtomNetId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn block_id_roundtrip() {
        let id = AtomBlockId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn net_id_equality() {
        let a = AtomNetId::from_raw(7);
        let b = AtomNetId::from_raw(7);
        let c = AtomNetId::from_raw(8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn pin_id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(AtomPinId::from_raw(1));
        set.insert(AtomPinId::from_raw(2));
        set.insert(AtomPinId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn port_id_display() {
        assert_eq!(format!("{}", AtomPortId::from_raw(9)), "9");
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = AtomNetId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: AtomNetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
