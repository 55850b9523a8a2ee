//! The pin-level graph of one cluster type.
//!
//! A [`PbGraph`] instantiates a [`PbType`](crate::pb_type::PbType) tree into
//! concrete nodes and pins. Every pin receives a flat
//! `pin_count_in_cluster` index: a node's input pins come first, then its
//! output pins, then its clock pins, then its children depth-first in
//! `[mode][child-type][slot]` order. The root node's external pins
//! therefore occupy the first indices, in inputs-outputs-clocks order.
//!
//! Interconnect edges (named connections between pins within a mode) are
//! added by the architecture reader via [`PbGraph::add_edge`]; only their
//! names participate in packed-netlist resolution.

use crate::arena::Arena;
use crate::ids::{PbGraphNodeId, PbGraphPinId};
use crate::pb_type::{PbType, PortKind};
use std::sync::Arc;

/// A named interconnect edge leaving a pin.
#[derive(Debug, Clone)]
pub struct PbGraphEdge {
    /// The interconnect name. Distinct interconnects within one scope have
    /// distinct names.
    pub interconnect: String,
    /// The pin this edge drives.
    pub sink: PbGraphPinId,
}

/// One concrete pin in the pin graph.
#[derive(Debug, Clone)]
pub struct PbGraphPin {
    /// The node this pin belongs to.
    pub node: PbGraphNodeId,
    /// Direction class of the owning port.
    pub kind: PortKind,
    /// Name of the owning port.
    pub port_name: String,
    /// Index of the owning port among same-kind ports of the node.
    pub port_index: u32,
    /// Bit position within the port.
    pub bit: u32,
    /// Flat pin index within the whole cluster.
    pub pin_count_in_cluster: u32,
    /// Outgoing interconnect edges.
    pub edges: Vec<PbGraphEdge>,
}

/// One concrete node in the pin graph, mirroring a pb-type instance.
#[derive(Debug, Clone)]
pub struct PbGraphNode {
    /// The pb type this node instantiates.
    pub pb_type: Arc<PbType>,
    /// The parent node, `None` for the cluster root.
    pub parent: Option<PbGraphNodeId>,
    /// Instance number among siblings of the same child type.
    pub placement_index: u32,
    /// Input pins, grouped per input port in declaration order.
    pub input_pins: Vec<Vec<PbGraphPinId>>,
    /// Output pins, grouped per output port in declaration order.
    pub output_pins: Vec<Vec<PbGraphPinId>>,
    /// Clock pins, grouped per clock port in declaration order.
    pub clock_pins: Vec<Vec<PbGraphPinId>>,
    /// Child nodes, indexed `[mode][child-type][slot]`.
    pub children: Vec<Vec<Vec<PbGraphNodeId>>>,
}

impl PbGraphNode {
    /// Returns the pin groups for the given port kind.
    pub fn pins_of_kind(&self, kind: PortKind) -> &[Vec<PbGraphPinId>] {
        match kind {
            PortKind::Input => &self.input_pins,
            PortKind::Output => &self.output_pins,
            PortKind::Clock => &self.clock_pins,
        }
    }
}

/// The instantiated pin graph of one cluster type.
#[derive(Debug, Clone)]
pub struct PbGraph {
    nodes: Arena<PbGraphNodeId, PbGraphNode>,
    pins: Arena<PbGraphPinId, PbGraphPin>,
    root: PbGraphNodeId,
    total_pins: u32,
}

impl PbGraph {
    /// Instantiates the pin graph for the given root pb type.
    pub fn build(root_type: &Arc<PbType>) -> Self {
        let mut graph = Self {
            nodes: Arena::new(),
            pins: Arena::new(),
            // Overwritten below; the first allocated node is the root.
            root: PbGraphNodeId::from_raw(0),
            total_pins: 0,
        };
        let mut next_pin = 0u32;
        let root = graph.build_node(root_type, None, 0, &mut next_pin);
        graph.root = root;
        graph.total_pins = next_pin;
        graph
    }

    fn build_node(
        &mut self,
        ty: &Arc<PbType>,
        parent: Option<PbGraphNodeId>,
        placement_index: u32,
        next_pin: &mut u32,
    ) -> PbGraphNodeId {
        let id = self.nodes.alloc(PbGraphNode {
            pb_type: Arc::clone(ty),
            parent,
            placement_index,
            input_pins: Vec::new(),
            output_pins: Vec::new(),
            clock_pins: Vec::new(),
            children: Vec::new(),
        });

        let input_pins = self.alloc_pins(id, ty, PortKind::Input, next_pin);
        let output_pins = self.alloc_pins(id, ty, PortKind::Output, next_pin);
        let clock_pins = self.alloc_pins(id, ty, PortKind::Clock, next_pin);

        let mut children = Vec::with_capacity(ty.modes.len());
        for mode in &ty.modes {
            let mut per_child = Vec::with_capacity(mode.children.len());
            for child in &mode.children {
                let mut slots = Vec::with_capacity(child.count as usize);
                for slot in 0..child.count {
                    slots.push(self.build_node(&child.pb_type, Some(id), slot, next_pin));
                }
                per_child.push(slots);
            }
            children.push(per_child);
        }

        let node = self.nodes.get_mut(id);
        node.input_pins = input_pins;
        node.output_pins = output_pins;
        node.clock_pins = clock_pins;
        node.children = children;
        id
    }

    fn alloc_pins(
        &mut self,
        node: PbGraphNodeId,
        ty: &PbType,
        kind: PortKind,
        next_pin: &mut u32,
    ) -> Vec<Vec<PbGraphPinId>> {
        let mut groups = Vec::new();
        let mut port_index = 0u32;
        for port in ty.ports.iter().filter(|p| p.kind == kind) {
            let mut group = Vec::with_capacity(port.width as usize);
            for bit in 0..port.width {
                let pin = self.pins.alloc(PbGraphPin {
                    node,
                    kind,
                    port_name: port.name.clone(),
                    port_index,
                    bit,
                    pin_count_in_cluster: *next_pin,
                    edges: Vec::new(),
                });
                *next_pin += 1;
                group.push(pin);
            }
            groups.push(group);
            port_index += 1;
        }
        groups
    }

    /// Returns the root node of the graph.
    pub fn root(&self) -> PbGraphNodeId {
        self.root
    }

    /// Returns the total number of pins in the cluster.
    pub fn total_pins(&self) -> u32 {
        self.total_pins
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: PbGraphNodeId) -> &PbGraphNode {
        self.nodes.get(id)
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PbGraphPinId) -> &PbGraphPin {
        self.pins.get(id)
    }

    /// Adds a named interconnect edge between two pins.
    pub fn add_edge(&mut self, from: PbGraphPinId, interconnect: &str, to: PbGraphPinId) {
        self.pins.get_mut(from).edges.push(PbGraphEdge {
            interconnect: interconnect.to_string(),
            sink: to,
        });
    }

    /// Finds a pin on `node` by port name and bit position.
    pub fn find_pin(&self, node: PbGraphNodeId, port: &str, bit: u32) -> Option<PbGraphPinId> {
        let n = self.nodes.get(node);
        for kind in [PortKind::Input, PortKind::Output, PortKind::Clock] {
            for group in n.pins_of_kind(kind) {
                let first = self.pins.get(group[0]);
                if first.port_name == port {
                    return group.get(bit as usize).copied();
                }
            }
        }
        None
    }

    /// Returns all pin IDs of `node` in canonical order (inputs, outputs,
    /// clocks, each per port in declaration order).
    pub fn node_pin_ids(&self, node: PbGraphNodeId) -> Vec<PbGraphPinId> {
        let n = self.nodes.get(node);
        let mut ids = Vec::new();
        for kind in [PortKind::Input, PortKind::Output, PortKind::Clock] {
            for group in n.pins_of_kind(kind) {
                ids.extend_from_slice(group);
            }
        }
        ids
    }
}
