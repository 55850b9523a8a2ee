//! Cross-reference maps between the atom netlist and the clustered netlist.
//!
//! The ingestor records, for every atom block, the cluster and pb instance
//! it was packed into, and for every atom net, the inter-cluster net that
//! carries it (if it crosses a cluster boundary). This is the only surface
//! through which the loader writes atom-to-cluster associations.

use crate::ids::{ExtNetId, PbId};
use fabric_atom::{AtomBlockId, AtomNetId};
use std::collections::HashMap;

/// Atom-to-cluster association maps populated during ingest.
#[derive(Debug, Default)]
pub struct AtomLookup {
    atom_pb: HashMap<AtomBlockId, (usize, PbId)>,
    atom_clb: HashMap<AtomBlockId, usize>,
    atom_net: HashMap<AtomNetId, ExtNetId>,
}

impl AtomLookup {
    /// Creates empty lookup maps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates an atom block with the pb instance it occupies.
    pub fn set_atom_pb(&mut self, block: AtomBlockId, cluster: usize, pb: PbId) {
        self.atom_pb.insert(block, (cluster, pb));
    }

    /// Returns the (cluster, pb) an atom block was packed into.
    pub fn atom_pb(&self, block: AtomBlockId) -> Option<(usize, PbId)> {
        self.atom_pb.get(&block).copied()
    }

    /// Associates an atom block with its containing cluster.
    pub fn set_atom_clb(&mut self, block: AtomBlockId, cluster: usize) {
        self.atom_clb.insert(block, cluster);
    }

    /// Returns the cluster an atom block was packed into.
    pub fn atom_clb(&self, block: AtomBlockId) -> Option<usize> {
        self.atom_clb.get(&block).copied()
    }

    /// Associates an atom net with the inter-cluster net carrying it, or
    /// clears the association for a cluster-internal net.
    pub fn set_atom_clb_net(&mut self, net: AtomNetId, ext: Option<ExtNetId>) {
        match ext {
            Some(ext) => {
                self.atom_net.insert(net, ext);
            }
            None => {
                self.atom_net.remove(&net);
            }
        }
    }

    /// Returns the inter-cluster net carrying an atom net, `None` for
    /// cluster-internal nets.
    pub fn atom_clb_net(&self, net: AtomNetId) -> Option<ExtNetId> {
        self.atom_net.get(&net).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_associations_roundtrip() {
        let mut lookup = AtomLookup::new();
        let blk = AtomBlockId::from_raw(3);
        assert!(lookup.atom_pb(blk).is_none());
        assert!(lookup.atom_clb(blk).is_none());

        lookup.set_atom_pb(blk, 1, PbId::from_raw(4));
        lookup.set_atom_clb(blk, 1);
        assert_eq!(lookup.atom_pb(blk), Some((1, PbId::from_raw(4))));
        assert_eq!(lookup.atom_clb(blk), Some(1));
    }

    #[test]
    fn net_association_can_be_cleared() {
        let mut lookup = AtomLookup::new();
        let net = AtomNetId::from_raw(0);
        lookup.set_atom_clb_net(net, Some(ExtNetId::from_raw(2)));
        assert_eq!(lookup.atom_clb_net(net), Some(ExtNetId::from_raw(2)));
        lookup.set_atom_clb_net(net, None);
        assert_eq!(lookup.atom_clb_net(net), None);
    }
}
