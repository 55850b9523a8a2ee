//! The clustered (post-pack) netlist data structures.
//!
//! One [`ClusteredBlock`] per placed cluster: its tree of [`Pb`] instances
//! mirroring the architecture hierarchy, the flat [`PbRouteEntry`] table
//! indexed by `pin_count_in_cluster`, and the per-external-pin mapping to
//! inter-cluster [`ExtNet`]s established by the net extractor.

use crate::ids::{ExtNetId, PbId};
use fabric_arch::{Arena, PbGraphNodeId};
use fabric_atom::AtomNetId;

/// One entry of a cluster's routing table, indexed by the flat
/// `pin_count_in_cluster` of the pin it describes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PbRouteEntry {
    /// The atom net carried by this pin, `None` when the wire is unused.
    pub atom_net: Option<AtomNetId>,
    /// Flat index of the upstream pin driving this one, `None` at cluster
    /// boundaries and on primitive outputs.
    pub prev_pb_pin: Option<u32>,
}

/// One physical-block instance inside a cluster.
#[derive(Debug, Clone)]
pub struct Pb {
    /// Instance name; `None` for an unoccupied ("open") slot.
    pub name: Option<String>,
    /// The architectural pin-graph node this instance occupies.
    pub graph_node: PbGraphNodeId,
    /// Index of the selected mode of the pb type.
    pub mode: usize,
    /// The parent instance, `None` for the cluster root.
    pub parent: Option<PbId>,
    /// Occupied child slots of the selected mode, indexed
    /// `[child-type][slot]`.
    pub children: Vec<Vec<Option<PbId>>>,
}

/// A placed cluster and its internal routing.
#[derive(Debug, Clone)]
pub struct ClusteredBlock {
    /// Instance name of the cluster.
    pub name: String,
    /// Index of the cluster's type descriptor in the architecture.
    pub cluster_type: usize,
    /// All pb instances of this cluster.
    pub pbs: Arena<PbId, Pb>,
    /// The root pb instance.
    pub root: PbId,
    /// Routing table, indexed by `pin_count_in_cluster`.
    pub pb_route: Vec<PbRouteEntry>,
    /// Per external pin: the inter-cluster net attached to it, filled by
    /// the net extractor.
    pub nets: Vec<Option<ExtNetId>>,
}

/// A cluster-side net terminal: one external pin of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPin {
    /// Index of the cluster in the block list.
    pub block: usize,
    /// External pin index within the cluster.
    pub pin: u32,
}

/// One deduplicated inter-cluster net.
#[derive(Debug, Clone)]
pub struct ExtNet {
    /// Net name, shared with the atom net it represents.
    pub name: String,
    /// Whether the net is a global signal. All its terminals must agree.
    pub is_global: bool,
    /// The driving terminal.
    pub driver: Option<ClusterPin>,
    /// The receiving terminals.
    pub sinks: Vec<ClusterPin>,
}

/// The loaded post-pack netlist: clusters plus their inter-cluster nets.
#[derive(Debug, Default)]
pub struct ClusteredNetlist {
    /// All clusters, in document order.
    pub blocks: Vec<ClusteredBlock>,
    /// All inter-cluster nets, indexed by [`ExtNetId`].
    pub ext_nets: Vec<ExtNet>,
}

impl ClusteredNetlist {
    /// Returns the external net with the given ID.
    pub fn ext_net(&self, id: ExtNetId) -> &ExtNet {
        &self.ext_nets[id.as_raw() as usize]
    }

    /// Finds an external net by name.
    pub fn find_ext_net(&self, name: &str) -> Option<(ExtNetId, &ExtNet)> {
        self.ext_nets
            .iter()
            .enumerate()
            .find(|(_, n)| n.name == name)
            .map(|(i, n)| (ExtNetId::from_raw(i as u32), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_entry_defaults_open() {
        let entry = PbRouteEntry::default();
        assert!(entry.atom_net.is_none());
        assert!(entry.prev_pb_pin.is_none());
    }

    #[test]
    fn find_ext_net_by_name() {
        let netlist = ClusteredNetlist {
            blocks: Vec::new(),
            ext_nets: vec![
                ExtNet {
                    name: "a".into(),
                    is_global: false,
                    driver: None,
                    sinks: Vec::new(),
                },
                ExtNet {
                    name: "clk".into(),
                    is_global: true,
                    driver: None,
                    sinks: Vec::new(),
                },
            ],
        };
        let (id, net) = netlist.find_ext_net("clk").unwrap();
        assert_eq!(id, ExtNetId::from_raw(1));
        assert!(net.is_global);
        assert!(netlist.find_ext_net("missing").is_none());
        assert_eq!(netlist.ext_net(ExtNetId::from_raw(0)).name, "a");
    }
}
