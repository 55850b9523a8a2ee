//! Inter-cluster net extraction.
//!
//! Walks every cluster's external pins in canonical order, interns the net
//! names carried by their routing-table entries into a deduplicated table,
//! and builds the `(net -> driver, sinks)` relation. Also enforces the
//! global-signal rules: a net's terminals must agree on the global flag,
//! and every declared circuit clock must resolve to a global net.

use crate::clustered::{ClusterPin, ClusteredBlock, ExtNet};
use crate::error::PackError;
use crate::ids::ExtNetId;
use fabric_arch::{Architecture, PinClass};
use fabric_atom::AtomNetlist;
use lasso::Rodeo;

/// The pin keyword that never names a net.
const OPEN: &str = "open";

/// Extracts the inter-cluster nets and fills each cluster's
/// per-external-pin net table.
pub fn load_external_nets(
    blocks: &mut [ClusteredBlock],
    arch: &Architecture,
    atoms: &AtomNetlist,
    circuit_clocks: &[String],
    file: &str,
) -> Result<Vec<ExtNet>, PackError> {
    let mut names: Rodeo<ExtNetId> = Rodeo::new();
    let mut occurrences: Vec<usize> = Vec::new();

    // First pass: intern the net name behind every connected external pin
    // and count occurrences.
    for cb in blocks.iter_mut() {
        let ty = &arch.cluster_types[cb.cluster_type];
        let graph = &ty.pb_graph;

        let external_pins = graph.node_pin_ids(graph.root());
        if external_pins.len() as u32 != ty.pins_per_instance() {
            return Err(PackError::consistency(
                file,
                format!(
                    "cluster type {} exposes {} pins but declares {} per instance",
                    ty.name,
                    external_pins.len(),
                    ty.pins_per_instance()
                ),
            ));
        }

        for (ipin, &pin) in external_pins.iter().enumerate() {
            let flat = graph.pin(pin).pin_count_in_cluster as usize;
            assert_eq!(flat, ipin, "root pins are numbered first");

            cb.nets[ipin] = match cb.pb_route[flat].atom_net {
                Some(net) => {
                    let name = atoms.net_name(net);
                    if name == OPEN {
                        None
                    } else {
                        let id = names.get_or_intern(name);
                        let idx = id.as_raw() as usize;
                        if idx == occurrences.len() {
                            occurrences.push(0);
                        }
                        occurrences[idx] += 1;
                        Some(id)
                    }
                }
                None => None,
            };
        }
    }

    let mut ext_nets: Vec<ExtNet> = (0..occurrences.len())
        .map(|i| ExtNet {
            name: names.resolve(&ExtNetId::from_raw(i as u32)).to_string(),
            is_global: false,
            driver: None,
            sinks: Vec::new(),
        })
        .collect();

    // Second pass: point each net back at its terminals. Each net has one
    // driver and (occurrences - 1) sinks.
    for (block_index, cb) in blocks.iter().enumerate() {
        let ty = &arch.cluster_types[cb.cluster_type];
        for (pin, net_id) in cb.nets.iter().enumerate() {
            let Some(net_id) = net_id else { continue };
            let idx = net_id.as_raw() as usize;
            let net = &mut ext_nets[idx];
            let terminal = ClusterPin {
                block: block_index,
                pin: pin as u32,
            };
            match ty.pin_class[pin] {
                PinClass::Receiver => {
                    if net.sinks.len() + 1 >= occurrences[idx] {
                        return Err(PackError::consistency(
                            file,
                            format!(
                                "net {} #{idx} inconsistency, expected {} terminals but encountered more, likely a net terminal is disconnected",
                                net.name,
                                occurrences[idx]
                            ),
                        ));
                    }
                    net.sinks.push(terminal);
                    // Mixing is detected after all terminals are known.
                    net.is_global = ty.is_global_pin[pin];
                }
                PinClass::Driver => {
                    if net.driver.is_some() {
                        return Err(PackError::consistency(
                            file,
                            format!("net {} has more than one driver", net.name),
                        ));
                    }
                    net.driver = Some(terminal);
                }
            }
        }
    }

    // Global and non-global pins must not share a net.
    for net in &ext_nets {
        for sink in &net.sinks {
            let ty = &arch.cluster_types[blocks[sink.block].cluster_type];
            if ty.is_global_pin[sink.pin as usize] != net.is_global {
                return Err(PackError::consistency(
                    file,
                    format!(
                        "netlist attempts to connect net {} to both global and non-global pins",
                        net.name
                    ),
                ));
            }
        }
    }

    // Every declared circuit clock must be a live, global net.
    for clock in circuit_clocks {
        match names.get(clock) {
            Some(id) => {
                let net = &ext_nets[id.as_raw() as usize];
                if !net.is_global {
                    return Err(PackError::consistency(
                        file,
                        format!("circuit clock {clock} is not connected to global pins"),
                    ));
                }
            }
            None => {
                return Err(PackError::consistency(
                    file,
                    format!("circuit clock {clock} does not drive any cluster pin"),
                ));
            }
        }
    }

    Ok(ext_nets)
}
