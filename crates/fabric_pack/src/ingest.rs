//! Packed-netlist ingestion.
//!
//! Walks the tree of `<block>` elements, populating one [`ClusteredBlock`]
//! per top-level cluster: its pb instance tree, its routing table, and the
//! atom-to-cluster bindings. After the walk, net identities are propagated
//! through internal pins, every atom is checked to be bound, constant
//! generators are verified, and the inter-cluster nets are extracted.

use crate::clustered::{ClusteredBlock, ClusteredNetlist, Pb, PbRouteEntry};
use crate::constgen::mark_constant_generators;
use crate::error::PackError;
use crate::extract::load_external_nets;
use crate::ids::{ExtNetId, PbId};
use crate::lookup::AtomLookup;
use crate::resolve::{resolve_pin_expr, ResolveError};
use crate::xml::{self, XmlNode};
use fabric_arch::{Architecture, Arena, ClusterType, PortKind};
use fabric_atom::AtomNetlist;
use log::{info, warn};
use std::sync::Arc;

/// The distinguished `instance` literal of the document root.
pub const ROOT_INSTANCE: &str = "FPGA_packed_netlist[0]";

/// The keyword marking a disconnected pin or an unoccupied slot.
const OPEN: &str = "open";

/// Reads a packed netlist document and reconstructs the clustered netlist.
///
/// `source` is the document text and `file_name` the name used in error
/// messages. The atom netlist must already hold every primitive and net the
/// document references. On success, returns the clustered netlist together
/// with the atom-to-cluster lookup maps.
pub fn read_packed_netlist(
    source: &str,
    file_name: &str,
    arch: &Architecture,
    atoms: &AtomNetlist,
) -> Result<(ClusteredNetlist, AtomLookup), PackError> {
    info!("Begin loading packed FPGA netlist file.");
    let doc = xml::parse_document(source, file_name)?;

    if doc.name != "block" {
        return Err(PackError::schema(
            file_name,
            doc.line,
            "Root element must be 'block'",
        ));
    }
    let top_name = doc.expect_attribute("name", file_name)?;
    info!("Netlist generated from file '{top_name}'.");

    let instance = doc.expect_attribute("instance", file_name)?;
    if instance != ROOT_INSTANCE {
        return Err(PackError::schema(
            file_name,
            doc.line,
            format!("Expected top instance to be \"{ROOT_INSTANCE}\", found \"{instance}\""),
        ));
    }

    // Top-level I/O lists. The inputs and outputs are informational; the
    // clocks feed the global-signal check.
    let _circuit_inputs: Vec<String> = doc
        .single_child("inputs", file_name)?
        .tokens()
        .map(String::from)
        .collect();
    let _circuit_outputs: Vec<String> = doc
        .single_child("outputs", file_name)?
        .tokens()
        .map(String::from)
        .collect();
    let circuit_clocks: Vec<String> = doc
        .single_child("clocks", file_name)?
        .tokens()
        .map(String::from)
        .collect();

    let mut lookup = AtomLookup::new();
    let mut num_primitives = 0usize;
    let mut blocks = Vec::new();
    for (index, block_xml) in doc.children_named("block").enumerate() {
        blocks.push(process_complex_block(
            block_xml,
            index,
            arch,
            atoms,
            &mut lookup,
            &mut num_primitives,
            file_name,
        )?);
    }
    if blocks.is_empty() {
        warn!("Packed netlist contains no clustered blocks");
    }

    // Every atom must have been bound to a pb, and nothing else.
    let num_atoms = atoms.blocks().count();
    if num_primitives != num_atoms {
        return Err(PackError::consistency(
            file_name,
            format!(
                "packed netlist holds {num_primitives} primitives but the atom netlist holds {num_atoms}"
            ),
        ));
    }
    for blk in atoms.blocks() {
        if lookup.atom_pb(blk).is_none() {
            return Err(PackError::consistency(
                file_name,
                format!(
                    "atom netlist and packed netlist do not match, packed netlist missing atom {}",
                    atoms.block_name(blk)
                ),
            ));
        }
    }

    mark_constant_generators(&blocks, arch, atoms, file_name)?;
    let ext_nets = load_external_nets(&mut blocks, arch, atoms, &circuit_clocks, file_name)?;

    // Map each atom net to the inter-cluster net carrying it.
    for net in atoms.nets() {
        lookup.set_atom_clb_net(net, None);
    }
    for (i, ext) in ext_nets.iter().enumerate() {
        let net = atoms
            .find_net(&ext.name)
            .expect("external net names are taken from atom nets");
        lookup.set_atom_clb_net(net, Some(ExtNetId::from_raw(i as u32)));
    }

    info!("Finished loading packed FPGA netlist file.");
    Ok((ClusteredNetlist { blocks, ext_nets }, lookup))
}

// Tokenizes `pb_type[slot]`.
fn parse_instance(instance: &str) -> Option<(&str, u32)> {
    let (name, rest) = instance.split_once('[')?;
    let slot: u32 = rest.strip_suffix(']')?.parse().ok()?;
    if name.is_empty() {
        return None;
    }
    Some((name, slot))
}

fn process_complex_block(
    xml: &XmlNode,
    index: usize,
    arch: &Architecture,
    atoms: &AtomNetlist,
    lookup: &mut AtomLookup,
    num_primitives: &mut usize,
    file: &str,
) -> Result<ClusteredBlock, PackError> {
    let name = xml.expect_attribute("name", file)?.to_string();
    let instance = xml.expect_attribute("instance", file)?;
    let (type_name, slot) = parse_instance(instance).ok_or_else(|| {
        PackError::schema(
            file,
            xml.line,
            format!("Unknown syntax for instance {instance}. Expected pb_type[instance_number]"),
        )
    })?;
    if slot as usize != index {
        return Err(PackError::shape(
            file,
            xml.line,
            format!("Instance slot {slot} does not match cluster index {index}"),
        ));
    }

    let (type_index, ty) = arch.find_cluster_type(type_name).ok_or_else(|| {
        PackError::unknown(
            file,
            xml.line,
            format!("Unknown cb type {type_name} for cb {name} #{index}"),
        )
    })?;

    let mode_name = xml.expect_attribute("mode", file)?;
    let mode = ty.pb_type.find_mode(mode_name).ok_or_else(|| {
        PackError::unknown(
            file,
            xml.line,
            format!("Unknown mode {mode_name} for cb {name} #{index}"),
        )
    })?;

    let graph = &ty.pb_graph;
    let mut pbs = Arena::new();
    let root = pbs.alloc(Pb {
        name: Some(name.clone()),
        graph_node: graph.root(),
        mode,
        parent: None,
        children: Vec::new(),
    });
    let mut cb = ClusteredBlock {
        name,
        cluster_type: type_index,
        pbs,
        root,
        pb_route: vec![PbRouteEntry::default(); graph.total_pins() as usize],
        nets: vec![None; ty.num_pins as usize],
    };

    process_pb(xml, index, &mut cb, root, ty, atoms, lookup, num_primitives, file)?;
    load_internal_net_ids(&mut cb);
    Ok(cb)
}

// Recursively populates one pb instance and its children from a <block>
// element.
#[allow(clippy::too_many_arguments)]
fn process_pb(
    xml: &XmlNode,
    cluster_index: usize,
    cb: &mut ClusteredBlock,
    pb: PbId,
    ty: &ClusterType,
    atoms: &AtomNetlist,
    lookup: &mut AtomLookup,
    num_primitives: &mut usize,
    file: &str,
) -> Result<(), PackError> {
    let graph = &ty.pb_graph;

    let inputs = xml.single_child("inputs", file)?;
    process_ports(inputs, Section::Inputs, cb, pb, ty, atoms, file)?;
    let outputs = xml.single_child("outputs", file)?;
    process_ports(outputs, Section::Outputs, cb, pb, ty, atoms, file)?;
    let clocks = xml.single_child("clocks", file)?;
    process_ports(clocks, Section::Clocks, cb, pb, ty, atoms, file)?;

    let node_id = cb.pbs[pb].graph_node;
    let node_ty = Arc::clone(&graph.node(node_id).pb_type);

    if node_ty.is_leaf() {
        // A leaf pb binds an atom; an unnamed leaf carries routing only.
        let Some(name) = cb.pbs[pb].name.clone() else {
            return Ok(());
        };
        let blk = atoms.find_block(&name).ok_or_else(|| {
            PackError::unknown(
                file,
                xml.line,
                format!(
                    "atom netlist and packed netlist do not match, encountered unknown primitive {name}"
                ),
            )
        })?;
        lookup.set_atom_pb(blk, cluster_index, pb);
        lookup.set_atom_clb(blk, cluster_index);
        *num_primitives += 1;
        return Ok(());
    }

    let mode = cb.pbs[pb].mode;
    cb.pbs[pb].children = node_ty.modes[mode]
        .children
        .iter()
        .map(|c| vec![None; c.count as usize])
        .collect();

    for child_xml in xml.children_named("block") {
        let instance = child_xml.expect_attribute("instance", file)?;
        let (child_type_name, slot) = parse_instance(instance).ok_or_else(|| {
            PackError::schema(
                file,
                child_xml.line,
                format!(
                    "Unknown syntax for instance {instance}. Expected pb_type[instance_number]"
                ),
            )
        })?;

        let (child_index, child) = node_ty.modes[mode]
            .find_child(child_type_name)
            .ok_or_else(|| {
                PackError::unknown(
                    file,
                    child_xml.line,
                    format!("Unknown pb type {child_type_name}"),
                )
            })?;
        if slot >= child.count {
            return Err(PackError::shape(
                file,
                child_xml.line,
                format!("Instance number exceeds # of pb available for instance {instance}"),
            ));
        }
        if cb.pbs[pb].children[child_index][slot as usize].is_some() {
            return Err(PackError::shape(
                file,
                child_xml.line,
                format!("node {instance} is used by two different blocks"),
            ));
        }

        let child_node = graph.node(node_id).children[mode][child_index][slot as usize];
        let child_name = child_xml.expect_attribute("name", file)?;

        if child_name != OPEN {
            let child_mode =
                match_child_mode(graph.node(child_node).pb_type.as_ref(), child_xml, slot, file)?;
            let child_pb = cb.pbs.alloc(Pb {
                name: Some(child_name.to_string()),
                graph_node: child_node,
                mode: child_mode,
                parent: Some(pb),
                children: Vec::new(),
            });
            cb.pbs[pb].children[child_index][slot as usize] = Some(child_pb);
            process_pb(
                child_xml,
                cluster_index,
                cb,
                child_pb,
                ty,
                atoms,
                lookup,
                num_primitives,
                file,
            )?;
        } else {
            // The slot holds no primitive but may still be traversed by
            // routing, flagged by a non-empty <outputs> section.
            let routing_used = match child_xml.first_child("outputs") {
                Some(outs) => {
                    if outs.first_child("port").is_none() {
                        return Err(PackError::schema(
                            file,
                            outs.line,
                            "open block with an 'outputs' section requires a 'port' child",
                        ));
                    }
                    true
                }
                None => false,
            };

            let child_pb = cb.pbs.alloc(Pb {
                name: None,
                graph_node: child_node,
                mode: 0,
                parent: Some(pb),
                children: Vec::new(),
            });
            cb.pbs[pb].children[child_index][slot as usize] = Some(child_pb);

            if routing_used {
                child_xml.expect_attribute("mode", file)?;
                let child_mode = match_child_mode(
                    graph.node(child_node).pb_type.as_ref(),
                    child_xml,
                    slot,
                    file,
                )?;
                cb.pbs[child_pb].mode = child_mode;
                process_pb(
                    child_xml,
                    cluster_index,
                    cb,
                    child_pb,
                    ty,
                    atoms,
                    lookup,
                    num_primitives,
                    file,
                )?;
            }
        }
    }
    Ok(())
}

// Matches the block's `mode` attribute against the pb type. A missing or
// unmatched mode is only an error for types that actually have modes.
fn match_child_mode(
    pb_type: &fabric_arch::PbType,
    xml: &XmlNode,
    slot: u32,
    file: &str,
) -> Result<usize, PackError> {
    let mode_name = xml.attribute("mode").unwrap_or("");
    match pb_type.find_mode(mode_name) {
        Some(mode) => Ok(mode),
        None if pb_type.modes.is_empty() => Ok(0),
        None => Err(PackError::unknown(
            file,
            xml.line,
            format!(
                "Unknown mode {mode_name} for cb {} #{slot}",
                xml.attribute("name").unwrap_or("")
            ),
        )),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Inputs,
    Outputs,
    Clocks,
}

impl Section {
    fn kind(self) -> PortKind {
        match self {
            Section::Inputs => PortKind::Input,
            Section::Outputs => PortKind::Output,
            Section::Clocks => PortKind::Clock,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Section::Inputs => "input",
            Section::Outputs => "output",
            Section::Clocks => "clock",
        }
    }
}

// Loads one <inputs>/<outputs>/<clocks> section into the routing table.
//
// Top-level input/clock pins and leaf output pins carry atom-net names
// directly; internal pins carry `pin->interconnect` expressions naming
// their upstream driver.
fn process_ports(
    section_xml: &XmlNode,
    section: Section,
    cb: &mut ClusteredBlock,
    pb: PbId,
    ty: &ClusterType,
    atoms: &AtomNetlist,
    file: &str,
) -> Result<(), PackError> {
    let graph = &ty.pb_graph;
    let node_id = cb.pbs[pb].graph_node;
    let node = graph.node(node_id);
    let kind = section.kind();

    for port_xml in section_xml.children_named("port") {
        let port_name = port_xml.expect_attribute("name", file)?;

        let (_, port) = node.pb_type.find_port(port_name).ok_or_else(|| {
            PackError::unknown(
                file,
                port_xml.line,
                format!(
                    "Unknown port {port_name} for pb {}[{}]",
                    node.pb_type.name, node.placement_index
                ),
            )
        })?;
        if port.kind != kind {
            return Err(PackError::unknown(
                file,
                port_xml.line,
                format!(
                    "Port {port_name} of pb {}[{}] does not belong in the {} section",
                    node.pb_type.name,
                    node.placement_index,
                    section.label()
                ),
            ));
        }
        let kind_index = node
            .pb_type
            .ports_of_kind(kind)
            .position(|p| p.name == port_name)
            .unwrap();
        let pins = &node.pins_of_kind(kind)[kind_index];

        let tokens: Vec<&str> = port_xml.tokens().collect();
        if tokens.len() != pins.len() {
            return Err(PackError::shape(
                file,
                port_xml.line,
                format!(
                    "Incorrect # pins {} found (expected {}) for {} port {port_name} for pb {}[{}]",
                    tokens.len(),
                    pins.len(),
                    section.label(),
                    node.pb_type.name,
                    node.placement_index
                ),
            ));
        }

        let is_root = cb.pbs[pb].parent.is_none();
        let is_leaf = node.pb_type.is_leaf();

        for (i, token) in tokens.iter().enumerate() {
            if *token == OPEN {
                continue;
            }
            let pin_index = graph.pin(pins[i]).pin_count_in_cluster as usize;

            // Boundary pins carry net names; internal pins carry upstream
            // pin expressions.
            let carries_net_name = match section {
                Section::Inputs | Section::Clocks => is_root,
                Section::Outputs => is_leaf,
            };

            if carries_net_name {
                let net = atoms.find_net(token).ok_or_else(|| {
                    PackError::unknown(
                        file,
                        port_xml.line,
                        format!(
                            "atom netlist and packed netlist do not match, unknown net {token} found in packed netlist"
                        ),
                    )
                })?;
                cb.pb_route[pin_index].atom_net = Some(net);
            } else {
                if !token.contains("->") {
                    return Err(PackError::schema(
                        file,
                        port_xml.line,
                        format!("Expected pin->interconnect expression, found {token}"),
                    ));
                }
                let (context, context_mode) = match section {
                    // Inputs and clocks are driven from the parent level.
                    Section::Inputs | Section::Clocks => {
                        let parent = cb.pbs[pb].parent.unwrap();
                        (cb.pbs[parent].graph_node, cb.pbs[parent].mode)
                    }
                    // Outputs of an intermediate pb are driven from within.
                    Section::Outputs => (node_id, cb.pbs[pb].mode),
                };
                let resolved = resolve_pin_expr(graph, context, context_mode, token)
                    .map_err(|e| resolve_error_to_pack(e, file, port_xml.line))?;
                cb.pb_route[pin_index].prev_pb_pin = Some(resolved.pin_count_in_cluster);
            }
        }
    }
    Ok(())
}

fn resolve_error_to_pack(err: ResolveError, file: &str, line: u32) -> PackError {
    match err {
        ResolveError::Malformed { expr } => PackError::schema(
            file,
            line,
            format!("Unknown syntax for pin expression {expr}"),
        ),
        ResolveError::UnknownPin { expr } => {
            PackError::unknown(file, line, format!("Unknown pin {expr}"))
        }
        ResolveError::UnknownInterconnect { interconnect, pin } => PackError::unknown(
            file,
            line,
            format!("Unknown interconnect {interconnect} connecting to pin {pin}"),
        ),
    }
}

// Propagates atom-net identities through internal pins: every routed pin
// inherits the net of its transitive upstream driver.
fn load_internal_net_ids(cb: &mut ClusteredBlock) {
    for pin in 0..cb.pb_route.len() {
        if cb.pb_route[pin].prev_pb_pin.is_some() && cb.pb_route[pin].atom_net.is_none() {
            load_atom_net_for_pin(&mut cb.pb_route, pin);
        }
    }
}

// The prev-pin graph is acyclic by architecture (it follows mode
// interconnects upward then across), so the recursion terminates.
fn load_atom_net_for_pin(pb_route: &mut [PbRouteEntry], pin: usize) {
    let driver = pb_route[pin]
        .prev_pb_pin
        .expect("pin has an upstream driver") as usize;
    assert!(pb_route[pin].atom_net.is_none());

    if pb_route[driver].atom_net.is_none() {
        load_atom_net_for_pin(pb_route, driver);
    }
    pb_route[pin].atom_net = pb_route[driver].atom_net;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_instance_accepts_well_formed() {
        assert_eq!(parse_instance("clb[0]"), Some(("clb", 0)));
        assert_eq!(parse_instance("lut4[12]"), Some(("lut4", 12)));
    }

    #[test]
    fn parse_instance_rejects_malformed() {
        assert_eq!(parse_instance("clb"), None);
        assert_eq!(parse_instance("clb[]"), None);
        assert_eq!(parse_instance("clb[x]"), None);
        assert_eq!(parse_instance("[0]"), None);
        assert_eq!(parse_instance("clb[0"), None);
    }

    #[test]
    fn transitive_fill_follows_chain() {
        use fabric_atom::AtomNetId;
        let net = AtomNetId::from_raw(7);
        let route = vec![
            PbRouteEntry {
                atom_net: Some(net),
                prev_pb_pin: None,
            },
            PbRouteEntry {
                atom_net: None,
                prev_pb_pin: Some(0),
            },
            PbRouteEntry {
                atom_net: None,
                prev_pb_pin: Some(1),
            },
        ];
        let mut cb = ClusteredBlock {
            name: "clb_0".into(),
            cluster_type: 0,
            pbs: Arena::new(),
            root: PbId::from_raw(0),
            pb_route: route,
            nets: Vec::new(),
        };
        load_internal_net_ids(&mut cb);
        assert_eq!(cb.pb_route[1].atom_net, Some(net));
        assert_eq!(cb.pb_route[2].atom_net, Some(net));
    }
}
