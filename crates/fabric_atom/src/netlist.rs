//! The ID-keyed relational store for the atom netlist.
//!
//! Blocks, ports, pins, and nets live in parallel slot vectors indexed by
//! their opaque IDs. Cross-references are ID-valued in both directions
//! (pin → net and net → pins), and every mutator keeps the two sides
//! synchronized. Removal tombstones the slot: IDs are never reused, so a
//! stale reference is detectable instead of silently aliasing.
//!
//! Entities are created once while the gate-level source is ingested and
//! mutated only by the transformation passes; all structural errors are
//! caught at ingest, so invariant violations inside a mutator panic.

use crate::error::AtomError;
use crate::ids::{AtomBlockId, AtomNetId, AtomPinId, AtomPortId};
use crate::truth_table::TruthTable;
use fabric_arch::{Model, PortKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The functional kind of an atom block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    /// A primary input pad.
    Inpad,
    /// A primary output pad.
    Outpad,
    /// A combinational primitive (LUT cover or black box).
    Combinational,
    /// A sequential primitive (latch or registered black box).
    Sequential,
}

/// Whether a pin drives its net or is driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    /// The pin is the unique source of its net.
    Driver,
    /// The pin is one of the net's fanout terminals.
    Sink,
}

#[derive(Debug, Clone)]
struct BlockData {
    name: String,
    ty: BlockType,
    model: Arc<Model>,
    truth_table: Option<TruthTable>,
    ports: Vec<AtomPortId>,
}

#[derive(Debug, Clone)]
struct PortData {
    block: AtomBlockId,
    name: String,
    kind: PortKind,
    pins: Vec<AtomPinId>,
}

#[derive(Debug, Clone)]
struct PinData {
    port: AtomPortId,
    bit: u32,
    ty: PinType,
    net: Option<AtomNetId>,
    is_constant: bool,
}

#[derive(Debug, Clone)]
struct NetData {
    name: String,
    driver: Option<AtomPinId>,
    sinks: Vec<AtomPinId>,
    is_global: bool,
}

/// The atom (primitive-level) netlist.
///
/// See the [module documentation](self) for the storage model. Accessors
/// taking an ID panic if the entity was removed; use the iterators or the
/// name lookups to obtain live IDs.
#[derive(Debug, Default)]
pub struct AtomNetlist {
    name: String,
    blocks: Vec<Option<BlockData>>,
    ports: Vec<Option<PortData>>,
    pins: Vec<Option<PinData>>,
    nets: Vec<Option<NetData>>,
    block_by_name: HashMap<String, AtomBlockId>,
    net_by_name: HashMap<String, AtomNetId>,
}

impl AtomNetlist {
    /// Creates an empty netlist with the given top-level model name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the netlist (top-level model) name.
    pub fn netlist_name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a block.
    ///
    /// Fails with [`AtomError::DuplicateName`] if a live block already has
    /// this name.
    pub fn add_block(
        &mut self,
        name: impl Into<String>,
        ty: BlockType,
        model: Arc<Model>,
        truth_table: Option<TruthTable>,
    ) -> Result<AtomBlockId, AtomError> {
        let name = name.into();
        if self.block_by_name.contains_key(&name) {
            return Err(AtomError::DuplicateName {
                kind: "block",
                name,
            });
        }
        let id = AtomBlockId::from_raw(self.blocks.len() as u32);
        self.block_by_name.insert(name.clone(), id);
        self.blocks.push(Some(BlockData {
            name,
            ty,
            model,
            truth_table,
            ports: Vec::new(),
        }));
        Ok(id)
    }

    /// Adds a port to a block, creating `width` pins.
    ///
    /// Pins of output ports are drivers; pins of input and clock ports are
    /// sinks. All pins start disconnected.
    ///
    /// # Panics
    ///
    /// Panics if the block was removed or `width` is zero.
    pub fn add_port(
        &mut self,
        block: AtomBlockId,
        name: impl Into<String>,
        kind: PortKind,
        width: u32,
    ) -> AtomPortId {
        assert!(width >= 1, "port width must be at least 1");
        let port_id = AtomPortId::from_raw(self.ports.len() as u32);
        let pin_ty = match kind {
            PortKind::Output => PinType::Driver,
            PortKind::Input | PortKind::Clock => PinType::Sink,
        };
        let mut pin_ids = Vec::with_capacity(width as usize);
        for bit in 0..width {
            let pin_id = AtomPinId::from_raw(self.pins.len() as u32);
            self.pins.push(Some(PinData {
                port: port_id,
                bit,
                ty: pin_ty,
                net: None,
                is_constant: false,
            }));
            pin_ids.push(pin_id);
        }
        self.ports.push(Some(PortData {
            block,
            name: name.into(),
            kind,
            pins: pin_ids,
        }));
        self.block_mut(block).ports.push(port_id);
        port_id
    }

    /// Adds a net, rebinding each supplied pin to it.
    ///
    /// Fails with [`AtomError::DuplicateName`] if a live net already has
    /// this name. A pin already attached to another live net is detached
    /// from it first.
    ///
    /// # Panics
    ///
    /// Panics if the driver is not a driver pin or a sink is not a sink pin.
    pub fn add_net(
        &mut self,
        name: impl Into<String>,
        driver: Option<AtomPinId>,
        sinks: Vec<AtomPinId>,
    ) -> Result<AtomNetId, AtomError> {
        let name = name.into();
        if self.net_by_name.contains_key(&name) {
            return Err(AtomError::DuplicateName { kind: "net", name });
        }
        let id = AtomNetId::from_raw(self.nets.len() as u32);
        if let Some(driver) = driver {
            assert_eq!(
                self.pin(driver).ty,
                PinType::Driver,
                "net driver must be a driver pin"
            );
            self.rebind_pin(driver, id);
        }
        for &sink in &sinks {
            assert_eq!(
                self.pin(sink).ty,
                PinType::Sink,
                "net sinks must be sink pins"
            );
            self.rebind_pin(sink, id);
        }
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Some(NetData {
            name,
            driver,
            sinks,
            is_global: false,
        }));
        Ok(id)
    }

    // Detaches the pin from its current net (if any) and points it at the
    // new one. The new net's pin lists are filled in by the caller.
    fn rebind_pin(&mut self, pin: AtomPinId, net: AtomNetId) {
        if let Some(old) = self.pin(pin).net {
            self.detach_pin_from_net(pin, old);
        }
        self.pin_mut(pin).net = Some(net);
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes a block along with all its ports and pins.
    ///
    /// Each pin is detached from its net: sink lists are compacted and a
    /// driven net's driver becomes invalid. Nets left dangling are *not*
    /// removed (see the sweep passes).
    ///
    /// # Panics
    ///
    /// Panics if the block was already removed.
    pub fn remove_block(&mut self, block: AtomBlockId) {
        let ports = self.block(block).ports.clone();
        for port in ports {
            let pins = self.port(port).pins.clone();
            for pin in pins {
                if let Some(net) = self.pin(pin).net {
                    self.detach_pin_from_net(pin, net);
                }
                self.pins[pin.as_raw() as usize] = None;
            }
            self.ports[port.as_raw() as usize] = None;
        }
        let name = self.block(block).name.clone();
        self.block_by_name.remove(&name);
        self.blocks[block.as_raw() as usize] = None;
    }

    /// Removes a net, marking every attached pin disconnected.
    ///
    /// # Panics
    ///
    /// Panics if the net was already removed.
    pub fn remove_net(&mut self, net: AtomNetId) {
        let data = self.nets[net.as_raw() as usize]
            .take()
            .expect("net already removed");
        if let Some(driver) = data.driver {
            self.pin_mut(driver).net = None;
        }
        for sink in data.sinks {
            self.pin_mut(sink).net = None;
        }
        self.net_by_name.remove(&data.name);
    }

    fn detach_pin_from_net(&mut self, pin: AtomPinId, net: AtomNetId) {
        let data = self.net_mut(net);
        if data.driver == Some(pin) {
            data.driver = None;
        } else {
            data.sinks.retain(|&p| p != pin);
        }
        self.pin_mut(pin).net = None;
    }

    // ========================================================================
    // Block queries
    // ========================================================================

    /// Iterates over all live block IDs.
    pub fn blocks(&self) -> impl Iterator<Item = AtomBlockId> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_some())
            .map(|(i, _)| AtomBlockId::from_raw(i as u32))
    }

    /// Looks up a live block by name.
    pub fn find_block(&self, name: &str) -> Option<AtomBlockId> {
        self.block_by_name.get(name).copied()
    }

    /// Returns the block's name.
    pub fn block_name(&self, block: AtomBlockId) -> &str {
        &self.block(block).name
    }

    /// Returns the block's functional kind.
    pub fn block_type(&self, block: AtomBlockId) -> BlockType {
        self.block(block).ty
    }

    /// Returns the block's shared model handle.
    pub fn block_model(&self, block: AtomBlockId) -> &Arc<Model> {
        &self.block(block).model
    }

    /// Returns the block's truth table, if it has one.
    pub fn block_truth_table(&self, block: AtomBlockId) -> Option<&TruthTable> {
        self.block(block).truth_table.as_ref()
    }

    /// Iterates over all ports of a block, in creation order.
    pub fn block_ports(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPortId> + '_ {
        self.block(block).ports.iter().copied()
    }

    /// Iterates over a block's input ports.
    pub fn block_input_ports(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPortId> + '_ {
        self.block_ports_of_kind(block, PortKind::Input)
    }

    /// Iterates over a block's output ports.
    pub fn block_output_ports(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPortId> + '_ {
        self.block_ports_of_kind(block, PortKind::Output)
    }

    /// Iterates over a block's clock ports.
    pub fn block_clock_ports(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPortId> + '_ {
        self.block_ports_of_kind(block, PortKind::Clock)
    }

    fn block_ports_of_kind(
        &self,
        block: AtomBlockId,
        kind: PortKind,
    ) -> impl Iterator<Item = AtomPortId> + '_ {
        self.block(block)
            .ports
            .iter()
            .copied()
            .filter(move |&p| self.port(p).kind == kind)
    }

    /// Iterates over every pin of a block.
    pub fn block_pins(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPinId> + '_ {
        self.block_ports(block)
            .flat_map(move |p| self.port(p).pins.iter().copied())
    }

    /// Iterates over a block's input pins.
    pub fn block_input_pins(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPinId> + '_ {
        self.block_input_ports(block)
            .flat_map(move |p| self.port(p).pins.iter().copied())
    }

    /// Iterates over a block's output pins.
    pub fn block_output_pins(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPinId> + '_ {
        self.block_output_ports(block)
            .flat_map(move |p| self.port(p).pins.iter().copied())
    }

    /// Iterates over a block's clock pins.
    pub fn block_clock_pins(&self, block: AtomBlockId) -> impl Iterator<Item = AtomPinId> + '_ {
        self.block_clock_ports(block)
            .flat_map(move |p| self.port(p).pins.iter().copied())
    }

    // ========================================================================
    // Port queries
    // ========================================================================

    /// Iterates over all live port IDs.
    pub fn ports(&self) -> impl Iterator<Item = AtomPortId> + '_ {
        self.ports
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_some())
            .map(|(i, _)| AtomPortId::from_raw(i as u32))
    }

    /// Returns the port's name.
    pub fn port_name(&self, port: AtomPortId) -> &str {
        &self.port(port).name
    }

    /// Returns the port's direction class.
    pub fn port_type(&self, port: AtomPortId) -> PortKind {
        self.port(port).kind
    }

    /// Returns the block owning the port.
    pub fn port_block(&self, port: AtomPortId) -> AtomBlockId {
        self.port(port).block
    }

    /// Returns the port's pins, one per bit.
    pub fn port_pins(&self, port: AtomPortId) -> &[AtomPinId] {
        &self.port(port).pins
    }

    /// Returns the port's declared width.
    pub fn port_width(&self, port: AtomPortId) -> u32 {
        self.port(port).pins.len() as u32
    }

    /// Returns the net attached to the given bit of the port, if any.
    pub fn port_net(&self, port: AtomPortId, bit: u32) -> Option<AtomNetId> {
        let pin = *self.port(port).pins.get(bit as usize)?;
        self.pin(pin).net
    }

    // ========================================================================
    // Pin queries
    // ========================================================================

    /// Iterates over all live pin IDs.
    pub fn pins(&self) -> impl Iterator<Item = AtomPinId> + '_ {
        self.pins
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_some())
            .map(|(i, _)| AtomPinId::from_raw(i as u32))
    }

    /// Returns the port owning the pin.
    pub fn pin_port(&self, pin: AtomPinId) -> AtomPortId {
        self.pin(pin).port
    }

    /// Returns the pin's bit position within its port.
    pub fn pin_port_bit(&self, pin: AtomPinId) -> u32 {
        self.pin(pin).bit
    }

    /// Returns the block owning the pin.
    pub fn pin_block(&self, pin: AtomPinId) -> AtomBlockId {
        self.port(self.pin(pin).port).block
    }

    /// Returns whether the pin drives or sinks its net.
    pub fn pin_type(&self, pin: AtomPinId) -> PinType {
        self.pin(pin).ty
    }

    /// Returns the net the pin belongs to, if any.
    pub fn pin_net(&self, pin: AtomPinId) -> Option<AtomNetId> {
        self.pin(pin).net
    }

    /// Returns whether the pin is flagged as a constant source.
    pub fn pin_is_constant(&self, pin: AtomPinId) -> bool {
        self.pin(pin).is_constant
    }

    /// Flags a pin as a constant source.
    ///
    /// Set by the gate-level reader for outputs of constant generators.
    pub fn set_pin_is_constant(&mut self, pin: AtomPinId, is_constant: bool) {
        self.pin_mut(pin).is_constant = is_constant;
    }

    // ========================================================================
    // Net queries
    // ========================================================================

    /// Iterates over all live net IDs.
    pub fn nets(&self) -> impl Iterator<Item = AtomNetId> + '_ {
        self.nets
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| AtomNetId::from_raw(i as u32))
    }

    /// Looks up a live net by name.
    pub fn find_net(&self, name: &str) -> Option<AtomNetId> {
        self.net_by_name.get(name).copied()
    }

    /// Returns the net's name.
    pub fn net_name(&self, net: AtomNetId) -> &str {
        &self.net(net).name
    }

    /// Returns the net's driver pin, if one is attached.
    pub fn net_driver(&self, net: AtomNetId) -> Option<AtomPinId> {
        self.net(net).driver
    }

    /// Returns the net's sink pins.
    pub fn net_sinks(&self, net: AtomNetId) -> &[AtomPinId] {
        &self.net(net).sinks
    }

    /// Returns every pin of the net: the driver (if any) followed by the
    /// sinks.
    pub fn net_pins(&self, net: AtomNetId) -> Vec<AtomPinId> {
        let data = self.net(net);
        let mut pins = Vec::with_capacity(data.sinks.len() + 1);
        pins.extend(data.driver);
        pins.extend_from_slice(&data.sinks);
        pins
    }

    /// Returns whether the net carries a constant value, derived from the
    /// driver pin's constant flag.
    pub fn net_is_constant(&self, net: AtomNetId) -> bool {
        self.net(net)
            .driver
            .map(|d| self.pin(d).is_constant)
            .unwrap_or(false)
    }

    /// Returns whether the net is a global signal.
    pub fn net_is_global(&self, net: AtomNetId) -> bool {
        self.net(net).is_global
    }

    /// Sets the net's global-signal flag.
    pub fn set_net_is_global(&mut self, net: AtomNetId, is_global: bool) {
        self.net_mut(net).is_global = is_global;
    }

    // ========================================================================
    // Internal slot access
    // ========================================================================

    fn block(&self, id: AtomBlockId) -> &BlockData {
        self.blocks[id.as_raw() as usize]
            .as_ref()
            .expect("block was removed")
    }

    fn block_mut(&mut self, id: AtomBlockId) -> &mut BlockData {
        self.blocks[id.as_raw() as usize]
            .as_mut()
            .expect("block was removed")
    }

    fn port(&self, id: AtomPortId) -> &PortData {
        self.ports[id.as_raw() as usize]
            .as_ref()
            .expect("port was removed")
    }

    fn pin(&self, id: AtomPinId) -> &PinData {
        self.pins[id.as_raw() as usize]
            .as_ref()
            .expect("pin was removed")
    }

    fn pin_mut(&mut self, id: AtomPinId) -> &mut PinData {
        self.pins[id.as_raw() as usize]
            .as_mut()
            .expect("pin was removed")
    }

    fn net(&self, id: AtomNetId) -> &NetData {
        self.nets[id.as_raw() as usize]
            .as_ref()
            .expect("net was removed")
    }

    fn net_mut(&mut self, id: AtomNetId) -> &mut NetData {
        self.nets[id.as_raw() as usize]
            .as_mut()
            .expect("net was removed")
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Checks every structural invariant of the store.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violation found. Intended for
    /// tests and for callers at pass boundaries.
    pub fn verify(&self) {
        // Pin -> net implies net -> pin, with matching pin type.
        for (i, slot) in self.pins.iter().enumerate() {
            let Some(pin) = slot else { continue };
            if let Some(net_id) = pin.net {
                let net = self.nets[net_id.as_raw() as usize]
                    .as_ref()
                    .unwrap_or_else(|| panic!("pin {i} references removed net {net_id}"));
                let pin_id = AtomPinId::from_raw(i as u32);
                match pin.ty {
                    PinType::Driver => assert_eq!(
                        net.driver,
                        Some(pin_id),
                        "driver pin {i} not recorded on net '{}'",
                        net.name
                    ),
                    PinType::Sink => assert!(
                        net.sinks.contains(&pin_id),
                        "sink pin {i} not recorded on net '{}'",
                        net.name
                    ),
                }
            }
        }

        // Net -> pin implies pin -> net, with matching pin type.
        for (i, slot) in self.nets.iter().enumerate() {
            let Some(net) = slot else { continue };
            let net_id = AtomNetId::from_raw(i as u32);
            if let Some(driver) = net.driver {
                let pin = self.pin(driver);
                assert_eq!(pin.ty, PinType::Driver, "net '{}' driver is a sink", net.name);
                assert_eq!(
                    pin.net,
                    Some(net_id),
                    "net '{}' driver points elsewhere",
                    net.name
                );
            }
            for &sink in &net.sinks {
                let pin = self.pin(sink);
                assert_eq!(pin.ty, PinType::Sink, "net '{}' sink is a driver", net.name);
                assert_eq!(
                    pin.net,
                    Some(net_id),
                    "net '{}' sink points elsewhere",
                    net.name
                );
            }
            assert_eq!(
                self.net_by_name.get(&net.name),
                Some(&net_id),
                "net '{}' missing from name index",
                net.name
            );
        }

        // Name index covers exactly the live blocks.
        for (i, slot) in self.blocks.iter().enumerate() {
            let Some(block) = slot else { continue };
            let block_id = AtomBlockId::from_raw(i as u32);
            assert_eq!(
                self.block_by_name.get(&block.name),
                Some(&block_id),
                "block '{}' missing from name index",
                block.name
            );

            // Kind / port-shape consistency.
            match block.ty {
                BlockType::Inpad => {
                    assert_eq!(
                        self.block_input_ports(block_id).count()
                            + self.block_clock_ports(block_id).count(),
                        0,
                        "inpad '{}' has input or clock ports",
                        block.name
                    );
                }
                BlockType::Outpad => {
                    assert_eq!(
                        self.block_output_ports(block_id).count(),
                        0,
                        "outpad '{}' has output ports",
                        block.name
                    );
                    assert_eq!(
                        self.block_input_pins(block_id).count(),
                        1,
                        "outpad '{}' must have exactly one input pin",
                        block.name
                    );
                }
                BlockType::Combinational | BlockType::Sequential => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_arch::{ModelLibrary, MODEL_INPUT, MODEL_NAMES, MODEL_OUTPUT};

    fn models() -> ModelLibrary {
        ModelLibrary::with_builtins()
    }

    fn add_lut(
        netlist: &mut AtomNetlist,
        lib: &ModelLibrary,
        name: &str,
        num_inputs: u32,
    ) -> AtomBlockId {
        let blk = netlist
            .add_block(
                name,
                BlockType::Combinational,
                lib.find(MODEL_NAMES).unwrap(),
                None,
            )
            .unwrap();
        netlist.add_port(blk, "in", PortKind::Input, num_inputs);
        netlist.add_port(blk, "out", PortKind::Output, 1);
        blk
    }

    #[test]
    fn add_block_and_ports() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let blk = add_lut(&mut nl, &lib, "lut_0", 4);
        assert_eq!(nl.block_name(blk), "lut_0");
        assert_eq!(nl.block_type(blk), BlockType::Combinational);
        assert_eq!(nl.block_pins(blk).count(), 5);
        assert_eq!(nl.block_input_pins(blk).count(), 4);
        assert_eq!(nl.block_output_pins(blk).count(), 1);
        assert_eq!(nl.find_block("lut_0"), Some(blk));
        nl.verify();
    }

    #[test]
    fn duplicate_block_name_rejected() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        add_lut(&mut nl, &lib, "lut_0", 4);
        let err = nl
            .add_block(
                "lut_0",
                BlockType::Combinational,
                lib.find(MODEL_NAMES).unwrap(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, AtomError::DuplicateName { kind: "block", .. }));
    }

    #[test]
    fn add_net_connects_both_sides() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let b = add_lut(&mut nl, &lib, "b", 1);
        let driver = nl.block_output_pins(a).next().unwrap();
        let sink = nl.block_input_pins(b).next().unwrap();

        let net = nl.add_net("n1", Some(driver), vec![sink]).unwrap();
        assert_eq!(nl.net_driver(net), Some(driver));
        assert_eq!(nl.net_sinks(net), &[sink]);
        assert_eq!(nl.pin_net(driver), Some(net));
        assert_eq!(nl.pin_net(sink), Some(net));
        assert_eq!(nl.find_net("n1"), Some(net));
        assert_eq!(nl.net_pins(net), vec![driver, sink]);
        nl.verify();
    }

    #[test]
    fn duplicate_net_name_rejected() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let driver = nl.block_output_pins(a).next().unwrap();
        nl.add_net("n1", Some(driver), vec![]).unwrap();
        let err = nl.add_net("n1", None, vec![]).unwrap_err();
        assert!(matches!(err, AtomError::DuplicateName { kind: "net", .. }));
    }

    #[test]
    fn add_net_rebinds_connected_pin() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let b = add_lut(&mut nl, &lib, "b", 1);
        let driver = nl.block_output_pins(a).next().unwrap();
        let sink = nl.block_input_pins(b).next().unwrap();

        let n1 = nl.add_net("n1", Some(driver), vec![sink]).unwrap();
        let n2 = nl.add_net("n2", None, vec![sink]).unwrap();

        // The sink moved; n1 keeps only its driver.
        assert_eq!(nl.pin_net(sink), Some(n2));
        assert!(nl.net_sinks(n1).is_empty());
        assert_eq!(nl.net_driver(n1), Some(driver));
        nl.verify();
    }

    #[test]
    fn remove_block_detaches_pins() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let b = add_lut(&mut nl, &lib, "b", 1);
        let a_out = nl.block_output_pins(a).next().unwrap();
        let b_in = nl.block_input_pins(b).next().unwrap();
        let net = nl.add_net("n1", Some(a_out), vec![b_in]).unwrap();

        let pins_before = nl.pins().count();
        let ports_before = nl.ports().count();
        nl.remove_block(b);
        // Net survives with its sink list compacted.
        assert_eq!(nl.net_driver(net), Some(a_out));
        assert!(nl.net_sinks(net).is_empty());
        assert_eq!(nl.find_block("b"), None);
        assert_eq!(nl.blocks().count(), 1);
        assert_eq!(nl.pins().count(), pins_before - 2);
        assert_eq!(nl.ports().count(), ports_before - 2);
        nl.verify();
    }

    #[test]
    fn remove_driver_block_invalidates_net_driver() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let b = add_lut(&mut nl, &lib, "b", 1);
        let a_out = nl.block_output_pins(a).next().unwrap();
        let b_in = nl.block_input_pins(b).next().unwrap();
        let net = nl.add_net("n1", Some(a_out), vec![b_in]).unwrap();

        nl.remove_block(a);
        assert_eq!(nl.net_driver(net), None);
        assert_eq!(nl.net_sinks(net), &[b_in]);
        nl.verify();
    }

    #[test]
    fn remove_net_clears_pins() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let b = add_lut(&mut nl, &lib, "b", 1);
        let a_out = nl.block_output_pins(a).next().unwrap();
        let b_in = nl.block_input_pins(b).next().unwrap();
        let net = nl.add_net("n1", Some(a_out), vec![b_in]).unwrap();

        nl.remove_net(net);
        assert_eq!(nl.pin_net(a_out), None);
        assert_eq!(nl.pin_net(b_in), None);
        assert_eq!(nl.find_net("n1"), None);
        assert_eq!(nl.nets().count(), 0);
        nl.verify();
    }

    #[test]
    fn removed_name_is_reusable_but_id_is_not() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        nl.remove_block(a);
        let a2 = add_lut(&mut nl, &lib, "a", 1);
        assert_ne!(a, a2);
        assert_eq!(nl.find_block("a"), Some(a2));
    }

    #[test]
    fn constant_flag_propagates_to_net() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "vcc_gen", 1);
        let out = nl.block_output_pins(a).next().unwrap();
        let net = nl.add_net("vcc", Some(out), vec![]).unwrap();

        assert!(!nl.net_is_constant(net));
        nl.set_pin_is_constant(out, true);
        assert!(nl.pin_is_constant(out));
        assert!(nl.net_is_constant(net));
    }

    #[test]
    fn global_flag_roundtrip() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        let out = nl.block_output_pins(a).next().unwrap();
        let net = nl.add_net("clk", Some(out), vec![]).unwrap();
        assert!(!nl.net_is_global(net));
        nl.set_net_is_global(net, true);
        assert!(nl.net_is_global(net));
    }

    #[test]
    fn port_net_by_bit() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 2);
        let b = add_lut(&mut nl, &lib, "b", 1);
        let b_out = nl.block_output_pins(b).next().unwrap();
        let in_port = nl.block_input_ports(a).next().unwrap();
        let bit1 = nl.port_pins(in_port)[1];
        let net = nl.add_net("n", Some(b_out), vec![bit1]).unwrap();

        assert_eq!(nl.port_net(in_port, 0), None);
        assert_eq!(nl.port_net(in_port, 1), Some(net));
        assert_eq!(nl.port_net(in_port, 7), None);
        assert_eq!(nl.port_width(in_port), 2);
        assert_eq!(nl.pin_port_bit(bit1), 1);
        assert_eq!(nl.pin_block(bit1), a);
    }

    #[test]
    fn pad_shape_invariants() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let inpad = nl
            .add_block("x", BlockType::Inpad, lib.find(MODEL_INPUT).unwrap(), None)
            .unwrap();
        nl.add_port(inpad, "inpad", PortKind::Output, 1);
        let outpad = nl
            .add_block(
                "out:y",
                BlockType::Outpad,
                lib.find(MODEL_OUTPUT).unwrap(),
                None,
            )
            .unwrap();
        nl.add_port(outpad, "outpad", PortKind::Input, 1);
        nl.verify();
    }

    #[test]
    #[should_panic(expected = "block was removed")]
    fn access_removed_block_panics() {
        let lib = models();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a", 1);
        nl.remove_block(a);
        nl.block_name(a);
    }
}
