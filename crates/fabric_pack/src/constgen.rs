//! Constant-generator identification.
//!
//! A leaf primitive whose input and clock pins are all unconnected in the
//! routing table produces a fixed value. The gate-level reader flags such
//! outputs constant on the atom pins; this walk re-derives the property
//! from the packed netlist and cross-checks the two views.

use crate::clustered::ClusteredBlock;
use crate::error::PackError;
use crate::ids::PbId;
use fabric_arch::{Architecture, ClusterType, PortKind, MODEL_INPUT};
use fabric_atom::AtomNetlist;
use log::info;

/// Verifies every constant generator in every cluster.
///
/// Fails with a [`PackError::Consistency`] when a constant generator
/// drives a net whose atom driver pin is not flagged constant.
pub fn mark_constant_generators(
    blocks: &[ClusteredBlock],
    arch: &Architecture,
    atoms: &AtomNetlist,
    file: &str,
) -> Result<(), PackError> {
    for cb in blocks {
        let ty = &arch.cluster_types[cb.cluster_type];
        mark_constant_generators_rec(cb, cb.root, ty, atoms, file)?;
    }
    Ok(())
}

fn mark_constant_generators_rec(
    cb: &ClusteredBlock,
    pb: PbId,
    ty: &ClusterType,
    atoms: &AtomNetlist,
    file: &str,
) -> Result<(), PackError> {
    let graph = &ty.pb_graph;
    let node = graph.node(cb.pbs[pb].graph_node);

    if !node.pb_type.is_leaf() {
        for slots in &cb.pbs[pb].children {
            for child in slots.iter().flatten() {
                if cb.pbs[*child].name.is_some() {
                    mark_constant_generators_rec(cb, *child, ty, atoms, file)?;
                }
            }
        }
        return Ok(());
    }

    // Primary inputs legitimately have no fan-in; everything else with no
    // connected input or clock is a constant generator.
    if node.pb_type.blif_model.as_deref() == Some(MODEL_INPUT) {
        return Ok(());
    }

    let const_gen = [PortKind::Input, PortKind::Clock].iter().all(|&kind| {
        node.pins_of_kind(kind).iter().flatten().all(|&pin| {
            let flat = graph.pin(pin).pin_count_in_cluster as usize;
            cb.pb_route[flat].atom_net.is_none()
        })
    });
    if !const_gen {
        return Ok(());
    }

    let name = cb.pbs[pb].name.as_deref().unwrap_or("open");
    info!("{name} is a constant generator.");

    for group in node.pins_of_kind(PortKind::Output) {
        for &pin in group {
            let flat = graph.pin(pin).pin_count_in_cluster as usize;
            let Some(net) = cb.pb_route[flat].atom_net else {
                continue;
            };
            let driver_constant = atoms
                .net_driver(net)
                .map(|d| atoms.pin_is_constant(d))
                .unwrap_or(false);
            if !driver_constant {
                return Err(PackError::consistency(
                    file,
                    format!(
                        "constant generator {name} drives net {} whose driver is not marked constant",
                        atoms.net_name(net)
                    ),
                ));
            }
        }
    }
    Ok(())
}
