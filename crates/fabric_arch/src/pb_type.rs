//! The architectural physical-block type tree.
//!
//! A [`PbType`] describes one level of a cluster's internal hierarchy: its
//! ports, and either a blif model (leaf primitives) or a set of [`Mode`]s,
//! each selecting a layout of replicated child types. The tree is built by
//! the (external) architecture reader and shared immutably afterwards.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The direction class of a pb port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// A data input port.
    Input,
    /// A data output port.
    Output,
    /// A clock input port.
    Clock,
}

/// A declared port on a pb type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PbPort {
    /// Port name, unique within the pb type.
    pub name: String,
    /// Declared bit width, always at least 1.
    pub width: u32,
    /// Direction class.
    pub kind: PortKind,
}

impl PbPort {
    /// Creates a port with the given name, width, and kind.
    pub fn new(name: impl Into<String>, width: u32, kind: PortKind) -> Self {
        Self {
            name: name.into(),
            width,
            kind,
        }
    }
}

/// One replicated child slot group within a mode.
#[derive(Debug, Clone)]
pub struct PbChild {
    /// The child pb type.
    pub pb_type: Arc<PbType>,
    /// Number of instances of this child in the mode.
    pub count: u32,
}

/// A mutually exclusive child layout of a pb type.
#[derive(Debug, Clone)]
pub struct Mode {
    /// Mode name, unique within the pb type.
    pub name: String,
    /// Child types instantiated by this mode.
    pub children: Vec<PbChild>,
}

impl Mode {
    /// Creates a mode with the given children.
    pub fn new(name: impl Into<String>, children: Vec<PbChild>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Finds a child slot group by pb-type name.
    pub fn find_child(&self, name: &str) -> Option<(usize, &PbChild)> {
        self.children
            .iter()
            .enumerate()
            .find(|(_, c)| c.pb_type.name == name)
    }
}

/// One level of the cluster-internal block hierarchy.
#[derive(Debug, Clone)]
pub struct PbType {
    /// Type name, unique among siblings.
    pub name: String,
    /// For leaf primitives, the name of the blif model they implement.
    pub blif_model: Option<String>,
    /// Declared ports, in declaration order.
    pub ports: Vec<PbPort>,
    /// Child layouts. Empty for leaf primitives.
    pub modes: Vec<Mode>,
}

impl PbType {
    /// Creates a leaf primitive type implementing the given blif model.
    pub fn leaf(name: impl Into<String>, blif_model: impl Into<String>, ports: Vec<PbPort>) -> Self {
        Self {
            name: name.into(),
            blif_model: Some(blif_model.into()),
            ports,
            modes: Vec::new(),
        }
    }

    /// Creates an intermediate type with the given modes.
    pub fn composite(name: impl Into<String>, ports: Vec<PbPort>, modes: Vec<Mode>) -> Self {
        Self {
            name: name.into(),
            blif_model: None,
            ports,
            modes,
        }
    }

    /// Returns `true` if this type is a leaf primitive (has no modes).
    pub fn is_leaf(&self) -> bool {
        self.modes.is_empty()
    }

    /// Finds a port by name, returning its declaration index.
    pub fn find_port(&self, name: &str) -> Option<(usize, &PbPort)> {
        self.ports.iter().enumerate().find(|(_, p)| p.name == name)
    }

    /// Finds a mode by name, returning its index.
    pub fn find_mode(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|m| m.name == name)
    }

    /// Iterates over ports of the given kind, in declaration order.
    pub fn ports_of_kind(&self, kind: PortKind) -> impl Iterator<Item = &PbPort> {
        self.ports.iter().filter(move |p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lut_type() -> PbType {
        PbType::leaf(
            "lut4",
            "names",
            vec![
                PbPort::new("in", 4, PortKind::Input),
                PbPort::new("out", 1, PortKind::Output),
            ],
        )
    }

    #[test]
    fn leaf_has_no_modes() {
        let lut = lut_type();
        assert!(lut.is_leaf());
        assert_eq!(lut.blif_model.as_deref(), Some("names"));
    }

    #[test]
    fn find_port_by_name() {
        let lut = lut_type();
        let (idx, port) = lut.find_port("out").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(port.width, 1);
        assert!(lut.find_port("missing").is_none());
    }

    #[test]
    fn ports_of_kind_filters() {
        let ff = PbType::leaf(
            "ff",
            "latch",
            vec![
                PbPort::new("D", 1, PortKind::Input),
                PbPort::new("Q", 1, PortKind::Output),
                PbPort::new("clk", 1, PortKind::Clock),
            ],
        );
        let inputs: Vec<_> = ff.ports_of_kind(PortKind::Input).collect();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, "D");
        let clocks: Vec<_> = ff.ports_of_kind(PortKind::Clock).collect();
        assert_eq!(clocks.len(), 1);
    }

    #[test]
    fn composite_modes_and_children() {
        let lut = Arc::new(lut_type());
        let ble = PbType::composite(
            "ble",
            vec![
                PbPort::new("in", 4, PortKind::Input),
                PbPort::new("out", 1, PortKind::Output),
            ],
            vec![Mode::new(
                "lut_only",
                vec![PbChild {
                    pb_type: Arc::clone(&lut),
                    count: 1,
                }],
            )],
        );
        assert!(!ble.is_leaf());
        assert_eq!(ble.find_mode("lut_only"), Some(0));
        assert_eq!(ble.find_mode("ff_only"), None);
        let (idx, child) = ble.modes[0].find_child("lut4").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(child.count, 1);
        assert!(ble.modes[0].find_child("mem").is_none());
    }
}
