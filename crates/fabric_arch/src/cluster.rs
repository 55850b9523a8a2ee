//! Cluster type descriptors and the device-model container.
//!
//! A [`ClusterType`] couples a root pb type with its instantiated
//! [`PbGraph`] and the per-external-pin attributes the netlist loader
//! checks: the driver/receiver class and the global-signal flag. The
//! [`Architecture`] owns every cluster type plus the model library.

use crate::model::ModelLibrary;
use crate::pb_graph::PbGraph;
use crate::pb_type::{PbType, PortKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The electrical class of an external cluster pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinClass {
    /// The pin drives inter-cluster nets (cluster outputs).
    Driver,
    /// The pin receives inter-cluster nets (cluster inputs and clocks).
    Receiver,
}

/// One placeable cluster type (CLB, I/O, RAM tile, ...).
#[derive(Debug, Clone)]
pub struct ClusterType {
    /// Type name, matching the root pb type.
    pub name: String,
    /// Number of cluster instances sharing one tile.
    pub capacity: u32,
    /// Total external pins across the whole tile (all capacity instances).
    pub num_pins: u32,
    /// Per external pin (one instance): whether the pin carries a global
    /// signal such as a clock.
    pub is_global_pin: Vec<bool>,
    /// Per external pin (one instance): driver or receiver class.
    pub pin_class: Vec<PinClass>,
    /// The root pb type.
    pub pb_type: Arc<PbType>,
    /// The instantiated pin graph.
    pub pb_graph: PbGraph,
}

impl ClusterType {
    /// Creates a cluster type from its root pb type.
    ///
    /// External pins are the root node's pins in canonical order (inputs,
    /// outputs, clocks). Input and clock pins are receivers, output pins
    /// drivers. Pins belonging to a root port named in `global_ports` are
    /// flagged global.
    pub fn new(pb_type: Arc<PbType>, capacity: u32, global_ports: &[&str]) -> Self {
        assert!(capacity >= 1, "cluster capacity must be at least 1");
        let pb_graph = PbGraph::build(&pb_type);

        let mut is_global_pin = Vec::new();
        let mut pin_class = Vec::new();
        for kind in [PortKind::Input, PortKind::Output, PortKind::Clock] {
            let class = match kind {
                PortKind::Output => PinClass::Driver,
                PortKind::Input | PortKind::Clock => PinClass::Receiver,
            };
            for port in pb_type.ports_of_kind(kind) {
                let global = global_ports.contains(&port.name.as_str());
                for _ in 0..port.width {
                    is_global_pin.push(global);
                    pin_class.push(class);
                }
            }
        }

        let pins_per_instance = is_global_pin.len() as u32;
        Self {
            name: pb_type.name.clone(),
            capacity,
            num_pins: pins_per_instance * capacity,
            is_global_pin,
            pin_class,
            pb_type,
            pb_graph,
        }
    }

    /// Returns the number of external pins of a single cluster instance.
    pub fn pins_per_instance(&self) -> u32 {
        self.num_pins / self.capacity
    }
}

/// The parsed device model: interned models plus every cluster type.
#[derive(Debug, Default)]
pub struct Architecture {
    /// The primitive model library.
    pub models: ModelLibrary,
    /// All placeable cluster types.
    pub cluster_types: Vec<ClusterType>,
}

impl Architecture {
    /// Creates an architecture with the given model library.
    pub fn new(models: ModelLibrary) -> Self {
        Self {
            models,
            cluster_types: Vec::new(),
        }
    }

    /// Adds a cluster type, returning its index.
    pub fn add_cluster_type(&mut self, ty: ClusterType) -> usize {
        self.cluster_types.push(ty);
        self.cluster_types.len() - 1
    }

    /// Finds a cluster type by name.
    pub fn find_cluster_type(&self, name: &str) -> Option<(usize, &ClusterType)> {
        self.cluster_types
            .iter()
            .enumerate()
            .find(|(_, t)| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pb_type::PbPort;

    fn clb_type() -> Arc<PbType> {
        Arc::new(PbType::composite(
            "clb",
            vec![
                PbPort::new("I", 4, PortKind::Input),
                PbPort::new("O", 1, PortKind::Output),
                PbPort::new("clk", 1, PortKind::Clock),
            ],
            vec![],
        ))
    }

    #[test]
    fn pin_classes_follow_port_kinds() {
        let ty = ClusterType::new(clb_type(), 1, &["clk"]);
        assert_eq!(ty.num_pins, 6);
        assert_eq!(ty.pins_per_instance(), 6);
        assert_eq!(ty.pin_class[0], PinClass::Receiver);
        assert_eq!(ty.pin_class[4], PinClass::Driver);
        assert_eq!(ty.pin_class[5], PinClass::Receiver);
    }

    #[test]
    fn global_flags_follow_port_names() {
        let ty = ClusterType::new(clb_type(), 1, &["clk"]);
        assert!(!ty.is_global_pin[0]);
        assert!(!ty.is_global_pin[4]);
        assert!(ty.is_global_pin[5]);
    }

    #[test]
    fn capacity_scales_num_pins() {
        let ty = ClusterType::new(clb_type(), 4, &[]);
        assert_eq!(ty.num_pins, 24);
        assert_eq!(ty.pins_per_instance(), 6);
        // Per-instance attribute arrays are not replicated.
        assert_eq!(ty.is_global_pin.len(), 6);
    }

    #[test]
    fn find_cluster_type_by_name() {
        let mut arch = Architecture::new(ModelLibrary::with_builtins());
        let idx = arch.add_cluster_type(ClusterType::new(clb_type(), 1, &[]));
        let (found, ty) = arch.find_cluster_type("clb").unwrap();
        assert_eq!(found, idx);
        assert_eq!(ty.name, "clb");
        assert!(arch.find_cluster_type("io").is_none());
    }
}
