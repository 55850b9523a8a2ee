//! Opaque ID newtypes for clustered-netlist entities.
//!
//! [`PbId`] indexes the per-cluster arena of physical-block instances.
//! [`ExtNetId`] indexes the deduplicated inter-cluster net table; it doubles
//! as the interner key, so interning a net name directly yields its compact
//! index.

use fabric_arch::ArenaId;
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
    };
}

define_id!(
    /// Opaque, copyable ID for a physical-block instance within one cluster.
    PbId
);

define_id!(
    /// Opaque, copyable ID for an inter-cluster (external) net.
    ExtNetId
);

impl ArenaId for PbId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `ExtNetId` wraps a `u32` which is always a valid `usize` on 32-bit
// and 64-bit platforms. `try_from_usize` rejects values that don't fit in
// `u32`.
unsafe impl lasso::Key for ExtNetId {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(ExtNetId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasso::Key;

    #[test]
    fn pb_id_roundtrip() {
        let id = PbId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn ext_net_id_as_interner_key() {
        let id = ExtNetId::try_from_usize(7).unwrap();
        assert_eq!(id.into_usize(), 7);
        assert_eq!(id, ExtNetId::from_raw(7));
    }

    #[test]
    fn ext_net_id_rejects_overflow() {
        assert!(ExtNetId::try_from_usize(usize::MAX).is_none());
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = PbId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: PbId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn interner_hands_out_sequential_ids() {
        let mut rodeo: lasso::Rodeo<ExtNetId> = lasso::Rodeo::new();
        let a = rodeo.get_or_intern("a");
        let b = rodeo.get_or_intern("b");
        let a2 = rodeo.get_or_intern("a");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(rodeo.resolve(&a), "a");
    }
}
