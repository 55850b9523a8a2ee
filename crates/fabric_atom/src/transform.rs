//! Structural transformation passes over the atom netlist.
//!
//! Buffer-LUT absorption merges the nets around identity LUTs while
//! preserving primary-input and primary-output names, and the sweep family
//! removes dangling inputs, outputs, blocks, and nets (plus constant-driven
//! primary outputs) until a fixpoint is reached.

use crate::ids::{AtomBlockId, AtomNetId};
use crate::logic::Logic;
use crate::netlist::{AtomNetlist, BlockType, PinType};
use fabric_arch::MODEL_NAMES;
use log::info;

/// Absorbs every buffer LUT in the netlist, returning how many were
/// removed.
///
/// A buffer LUT implements the identity function over a single connected
/// input and output (`1 1` or `0 0` cover). Absorbing one merges its input
/// and output nets into a single net driven by the upstream driver. A
/// buffer connecting a primary input directly to a primary output is kept,
/// since neither endpoint's name could survive the merge.
pub fn absorb_buffer_luts(netlist: &mut AtomNetlist) -> usize {
    let buffer_luts = identify_buffer_luts(netlist);
    info!("Absorbing {} LUT buffers", buffer_luts.len());

    let mut removed = 0;
    for blk in buffer_luts {
        if remove_buffer_lut(netlist, blk) {
            removed += 1;
        }
    }
    removed
}

fn identify_buffer_luts(netlist: &AtomNetlist) -> Vec<AtomBlockId> {
    netlist
        .blocks()
        .filter(|&blk| is_buffer_lut(netlist, blk))
        .collect()
}

/// Returns `true` if the block is a single-input identity LUT.
pub fn is_buffer_lut(netlist: &AtomNetlist, blk: AtomBlockId) -> bool {
    if netlist.block_type(blk) != BlockType::Combinational {
        return false;
    }
    if netlist.block_model(blk).name != MODEL_NAMES {
        return false;
    }

    // Buffer LUTs have a single input port and a single output port, with
    // exactly one connected pin on each.
    if netlist.block_input_ports(blk).count() != 1 || netlist.block_output_ports(blk).count() != 1 {
        return false;
    }
    let connected_input_pins = netlist
        .block_input_pins(blk)
        .filter(|&p| netlist.pin_net(p).is_some())
        .count();
    let connected_output_pins = netlist
        .block_output_pins(blk)
        .filter(|&p| netlist.pin_net(p).is_some())
        .count();
    if connected_input_pins != 1 || connected_output_pins != 1 {
        return false;
    }

    // The identity function is a one-row cover of the form `1 1` (on-set)
    // or `0 0` (off-set).
    match netlist.block_truth_table(blk) {
        Some(table) => {
            table.len() == 1
                && table[0].len() == 2
                && (table[0] == [Logic::True, Logic::True]
                    || table[0] == [Logic::False, Logic::False])
        }
        None => false,
    }
}

// Removes one buffer LUT, returning false when it has to be kept.
//
// The buffer's input net (driver D, sinks including the buffer input) and
// output net (driven by the buffer, sinks S) become one net with driver D
// and sinks (input sinks minus the buffer input) plus S. The merged net's
// name follows the primary-input / primary-output preservation rule; when
// the driver is a primary input AND a primary output is among the sinks,
// both names would need to survive, so the buffer stays.
fn remove_buffer_lut(netlist: &mut AtomNetlist, blk: AtomBlockId) -> bool {
    let connected_inputs: Vec<_> = netlist
        .block_input_pins(blk)
        .filter(|&p| netlist.pin_net(p).is_some())
        .collect();
    let connected_outputs: Vec<_> = netlist
        .block_output_pins(blk)
        .filter(|&p| netlist.pin_net(p).is_some())
        .collect();
    assert_eq!(connected_inputs.len(), 1, "buffer LUT has one connected input");
    assert_eq!(connected_outputs.len(), 1, "buffer LUT has one connected output");

    let input_pin = connected_inputs[0];
    let output_pin = connected_outputs[0];
    let input_net = netlist.pin_net(input_pin).unwrap();
    let output_net = netlist.pin_net(output_pin).unwrap();

    let new_driver = netlist
        .net_driver(input_net)
        .expect("buffer input net has a driver");
    assert_eq!(netlist.pin_type(new_driver), PinType::Driver);

    // The buffer's own pins are not carried over.
    let mut new_sinks: Vec<_> = netlist
        .net_sinks(input_net)
        .iter()
        .copied()
        .filter(|&p| p != input_pin)
        .collect();
    new_sinks.extend_from_slice(netlist.net_sinks(output_net));

    let driver_is_pi = netlist.block_type(netlist.pin_block(new_driver)) == BlockType::Inpad;
    let po_in_sinks = new_sinks
        .iter()
        .any(|&p| netlist.block_type(netlist.pin_block(p)) == BlockType::Outpad);

    let new_net_name = match (driver_is_pi, po_in_sinks) {
        // No PI or PO constrains the name; the output name is as good as any.
        (false, false) => netlist.net_name(output_net).to_string(),
        // Keep the primary-input name.
        (true, false) => netlist.net_name(input_net).to_string(),
        // Keep the primary-output name.
        (false, true) => netlist.net_name(output_net).to_string(),
        // A buffered connection from primary input to primary output:
        // removing it would lose one of the two names.
        (true, true) => return false,
    };

    netlist.remove_block(blk);
    assert_eq!(netlist.net_driver(output_net), None);

    netlist.remove_net(input_net);
    netlist.remove_net(output_net);
    netlist
        .add_net(new_net_name, Some(new_driver), new_sinks)
        .expect("merged net name was freed by removing both nets");
    true
}

/// Returns `true` if the block has no fanout (no connected output pin).
pub fn is_removable_block(netlist: &AtomNetlist, blk: AtomBlockId) -> bool {
    netlist
        .block_output_pins(blk)
        .all(|p| netlist.pin_net(p).is_none())
}

/// Returns `true` if the block is a primary input with no fanout.
pub fn is_removable_input(netlist: &AtomNetlist, blk: AtomBlockId) -> bool {
    netlist.block_type(blk) == BlockType::Inpad && is_removable_block(netlist, blk)
}

/// Returns `true` if the block is a primary output with no fan-in.
pub fn is_removable_output(netlist: &AtomNetlist, blk: AtomBlockId) -> bool {
    netlist.block_type(blk) == BlockType::Outpad
        && netlist
            .block_input_pins(blk)
            .all(|p| netlist.pin_net(p).is_none())
}

/// Removes non-I/O blocks with no fanout. Returns the number removed.
pub fn sweep_blocks(netlist: &mut AtomNetlist) -> usize {
    let to_remove: Vec<_> = netlist
        .blocks()
        .filter(|&blk| {
            let ty = netlist.block_type(blk);
            // Pads have their own sweeps.
            ty != BlockType::Inpad && ty != BlockType::Outpad && is_removable_block(netlist, blk)
        })
        .collect();
    for blk in &to_remove {
        netlist.remove_block(*blk);
    }
    to_remove.len()
}

/// Removes primary inputs with no fanout. Returns the number removed.
pub fn sweep_inputs(netlist: &mut AtomNetlist) -> usize {
    let to_remove: Vec<_> = netlist
        .blocks()
        .filter(|&blk| is_removable_input(netlist, blk))
        .collect();
    for blk in &to_remove {
        netlist.remove_block(*blk);
    }
    to_remove.len()
}

/// Removes primary outputs with no fan-in. Returns the number removed.
pub fn sweep_outputs(netlist: &mut AtomNetlist) -> usize {
    let to_remove: Vec<_> = netlist
        .blocks()
        .filter(|&blk| is_removable_output(netlist, blk))
        .collect();
    for blk in &to_remove {
        netlist.remove_block(*blk);
    }
    to_remove.len()
}

/// Removes nets with no driver or no sinks. Returns the number removed.
pub fn sweep_nets(netlist: &mut AtomNetlist) -> usize {
    let to_remove: Vec<AtomNetId> = netlist
        .nets()
        .filter(|&net| netlist.net_driver(net).is_none() || netlist.net_sinks(net).is_empty())
        .collect();
    for net in &to_remove {
        netlist.remove_net(*net);
    }
    to_remove.len()
}

/// Removes primary outputs whose inputs are all unconnected or driven by
/// constant nets. Returns the number removed.
pub fn sweep_constant_primary_outputs(netlist: &mut AtomNetlist) -> usize {
    let to_remove: Vec<_> = netlist
        .blocks()
        .filter(|&blk| {
            if netlist.block_type(blk) != BlockType::Outpad {
                return false;
            }
            debug_assert_eq!(netlist.block_output_pins(blk).count(), 0);
            debug_assert_eq!(netlist.block_clock_pins(blk).count(), 0);
            netlist.block_input_pins(blk).all(|p| match netlist.pin_net(p) {
                Some(net) => netlist.net_is_constant(net),
                None => true,
            })
        })
        .collect();
    for blk in &to_remove {
        netlist.remove_block(*blk);
    }
    to_remove.len()
}

/// Selects which sweeps [`sweep_iterative`] applies.
#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    /// Sweep dangling primary inputs and outputs.
    pub sweep_ios: bool,
    /// Sweep dangling nets.
    pub sweep_nets: bool,
    /// Sweep dangling non-I/O blocks.
    pub sweep_blocks: bool,
    /// Sweep constant-driven primary outputs.
    pub sweep_constant_primary_outputs: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            sweep_ios: true,
            sweep_nets: true,
            sweep_blocks: true,
            sweep_constant_primary_outputs: true,
        }
    }
}

/// Applies the enabled sweeps repeatedly until a full pass removes
/// nothing, and returns the total number of removed entities.
///
/// Sweeping one entity can expose more dead entities (a removed sink can
/// leave its net dangling, which leaves its driver without fanout), so a
/// single pass is not enough. The fixpoint does not depend on removal
/// order within a pass.
pub fn sweep_iterative(netlist: &mut AtomNetlist, options: SweepOptions) -> usize {
    let mut nets_swept = 0;
    let mut blocks_swept = 0;
    let mut inputs_swept = 0;
    let mut outputs_swept = 0;
    let mut constant_outputs_swept = 0;

    loop {
        let mut pass_swept = 0;

        if options.sweep_ios {
            let inputs = sweep_inputs(netlist);
            let outputs = sweep_outputs(netlist);
            inputs_swept += inputs;
            outputs_swept += outputs;
            pass_swept += inputs + outputs;
        }
        if options.sweep_blocks {
            let blocks = sweep_blocks(netlist);
            blocks_swept += blocks;
            pass_swept += blocks;
        }
        if options.sweep_nets {
            let nets = sweep_nets(netlist);
            nets_swept += nets;
            pass_swept += nets;
        }
        if options.sweep_constant_primary_outputs {
            let constants = sweep_constant_primary_outputs(netlist);
            constant_outputs_swept += constants;
            pass_swept += constants;
        }

        if pass_swept == 0 {
            break;
        }
    }

    info!("Swept input(s) : {inputs_swept}");
    info!(
        "Swept output(s): {} ({} dangling, {} constant)",
        outputs_swept + constant_outputs_swept,
        outputs_swept,
        constant_outputs_swept
    );
    info!("Swept net(s)   : {nets_swept}");
    info!("Swept block(s) : {blocks_swept}");

    nets_swept + blocks_swept + inputs_swept + outputs_swept + constant_outputs_swept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::AtomPinId;
    use fabric_arch::{ModelLibrary, PortKind, MODEL_INPUT, MODEL_OUTPUT};

    fn lib() -> ModelLibrary {
        ModelLibrary::with_builtins()
    }

    fn add_inpad(nl: &mut AtomNetlist, lib: &ModelLibrary, name: &str) -> (AtomBlockId, AtomPinId) {
        let blk = nl
            .add_block(name, BlockType::Inpad, lib.find(MODEL_INPUT).unwrap(), None)
            .unwrap();
        nl.add_port(blk, "inpad", PortKind::Output, 1);
        let pin = nl.block_output_pins(blk).next().unwrap();
        (blk, pin)
    }

    fn add_outpad(nl: &mut AtomNetlist, lib: &ModelLibrary, name: &str) -> (AtomBlockId, AtomPinId) {
        let blk = nl
            .add_block(name, BlockType::Outpad, lib.find(MODEL_OUTPUT).unwrap(), None)
            .unwrap();
        nl.add_port(blk, "outpad", PortKind::Input, 1);
        let pin = nl.block_input_pins(blk).next().unwrap();
        (blk, pin)
    }

    fn add_lut(
        nl: &mut AtomNetlist,
        lib: &ModelLibrary,
        name: &str,
        table: crate::truth_table::TruthTable,
    ) -> AtomBlockId {
        let blk = nl
            .add_block(
                name,
                BlockType::Combinational,
                lib.find(MODEL_NAMES).unwrap(),
                Some(table),
            )
            .unwrap();
        nl.add_port(blk, "in", PortKind::Input, 1);
        nl.add_port(blk, "out", PortKind::Output, 1);
        blk
    }

    fn buffer_table() -> crate::truth_table::TruthTable {
        vec![vec![Logic::True, Logic::True]]
    }

    // pi -> buf -> lut2. The buffer's merged net keeps the PI name.
    #[test]
    fn absorb_keeps_primary_input_name() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let (_pi, pi_out) = add_inpad(&mut nl, &lib, "a");
        let buf = add_lut(&mut nl, &lib, "buf", buffer_table());
        let downstream = add_lut(&mut nl, &lib, "f", vec![vec![Logic::False, Logic::True]]);

        let buf_in = nl.block_input_pins(buf).next().unwrap();
        let buf_out = nl.block_output_pins(buf).next().unwrap();
        let down_in = nl.block_input_pins(downstream).next().unwrap();

        nl.add_net("a", Some(pi_out), vec![buf_in]).unwrap();
        nl.add_net("mid", Some(buf_out), vec![down_in]).unwrap();

        assert!(is_buffer_lut(&nl, buf));
        assert_eq!(absorb_buffer_luts(&mut nl), 1);

        let net = nl.find_net("a").expect("merged net keeps the PI name");
        assert!(nl.find_net("mid").is_none());
        assert_eq!(nl.net_driver(net), Some(pi_out));
        assert_eq!(nl.net_sinks(net), &[down_in]);
        assert!(nl.find_block("buf").is_none());
        nl.verify();
    }

    // lut1 -> buf -> po. The merged net keeps the PO-facing name.
    #[test]
    fn absorb_keeps_primary_output_name() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let upstream = add_lut(&mut nl, &lib, "g", vec![vec![Logic::True, Logic::True]]);
        let buf = add_lut(&mut nl, &lib, "buf", buffer_table());
        let (_po, po_in) = add_outpad(&mut nl, &lib, "out:y");

        let up_out = nl.block_output_pins(upstream).next().unwrap();
        let buf_in = nl.block_input_pins(buf).next().unwrap();
        let buf_out = nl.block_output_pins(buf).next().unwrap();

        nl.add_net("mid", Some(up_out), vec![buf_in]).unwrap();
        nl.add_net("y", Some(buf_out), vec![po_in]).unwrap();

        assert_eq!(absorb_buffer_luts(&mut nl), 1);
        let net = nl.find_net("y").expect("merged net keeps the PO name");
        assert_eq!(nl.net_driver(net), Some(up_out));
        assert_eq!(nl.net_sinks(net), &[po_in]);
        nl.verify();
    }

    // pi -> buf -> po is left alone: both endpoint names must survive.
    #[test]
    fn buffer_between_pi_and_po_is_kept() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let (_pi, pi_out) = add_inpad(&mut nl, &lib, "x");
        let buf = add_lut(&mut nl, &lib, "b", buffer_table());
        let (_po, po_in) = add_outpad(&mut nl, &lib, "out:y");

        let buf_in = nl.block_input_pins(buf).next().unwrap();
        let buf_out = nl.block_output_pins(buf).next().unwrap();
        nl.add_net("x", Some(pi_out), vec![buf_in]).unwrap();
        nl.add_net("y", Some(buf_out), vec![po_in]).unwrap();

        assert!(is_buffer_lut(&nl, buf));
        assert_eq!(absorb_buffer_luts(&mut nl), 0);
        assert!(nl.find_block("b").is_some());
        assert!(nl.find_net("x").is_some());
        assert!(nl.find_net("y").is_some());
        nl.verify();
    }

    #[test]
    fn off_set_buffer_is_recognized() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let buf = add_lut(
            &mut nl,
            &lib,
            "b",
            vec![vec![Logic::False, Logic::False]],
        );
        let (_pi, pi_out) = add_inpad(&mut nl, &lib, "a");
        let downstream = add_lut(&mut nl, &lib, "f", vec![vec![Logic::True, Logic::True]]);
        let buf_in = nl.block_input_pins(buf).next().unwrap();
        let buf_out = nl.block_output_pins(buf).next().unwrap();
        let down_in = nl.block_input_pins(downstream).next().unwrap();
        nl.add_net("a", Some(pi_out), vec![buf_in]).unwrap();
        nl.add_net("mid", Some(buf_out), vec![down_in]).unwrap();
        assert!(is_buffer_lut(&nl, buf));
    }

    #[test]
    fn inverter_is_not_a_buffer() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let inv = add_lut(&mut nl, &lib, "inv", vec![vec![Logic::False, Logic::True]]);
        let (_pi, pi_out) = add_inpad(&mut nl, &lib, "a");
        let (_po, po_in) = add_outpad(&mut nl, &lib, "out:y");
        let inv_in = nl.block_input_pins(inv).next().unwrap();
        let inv_out = nl.block_output_pins(inv).next().unwrap();
        nl.add_net("a", Some(pi_out), vec![inv_in]).unwrap();
        nl.add_net("y", Some(inv_out), vec![po_in]).unwrap();
        assert!(!is_buffer_lut(&nl, inv));
    }

    #[test]
    fn sweep_dangling_net() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let (_pi, pi_out) = add_inpad(&mut nl, &lib, "a");
        nl.add_net("floating", Some(pi_out), vec![]).unwrap();
        assert_eq!(sweep_nets(&mut nl), 1);
        assert_eq!(nl.nets().count(), 0);
    }

    #[test]
    fn sweep_constant_output() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let vcc = add_lut(&mut nl, &lib, "vcc", vec![vec![Logic::True]]);
        let (_po, po_in) = add_outpad(&mut nl, &lib, "out:y");
        let vcc_out = nl.block_output_pins(vcc).next().unwrap();
        nl.add_net("vcc", Some(vcc_out), vec![po_in]).unwrap();
        nl.set_pin_is_constant(vcc_out, true);

        assert_eq!(sweep_constant_primary_outputs(&mut nl), 1);
        assert!(nl.find_block("out:y").is_none());
    }

    // A -> B -> C chain where C is a dead output. Each pass unlocks the
    // next removal; the iterative sweep reaches the empty fixpoint.
    #[test]
    fn iterative_sweep_chain_fixpoint() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let a = add_lut(&mut nl, &lib, "a_lut", vec![vec![Logic::True, Logic::True]]);
        let b = add_lut(&mut nl, &lib, "b_lut", vec![vec![Logic::True, Logic::True]]);
        let (_c, c_in) = add_outpad(&mut nl, &lib, "out:c");

        let a_out = nl.block_output_pins(a).next().unwrap();
        let b_in = nl.block_input_pins(b).next().unwrap();
        let b_out = nl.block_output_pins(b).next().unwrap();
        nl.add_net("ab", Some(a_out), vec![b_in]).unwrap();
        nl.add_net("bc", Some(b_out), vec![c_in]).unwrap();

        // Disconnect the output pad's fan-in to make it dead.
        nl.remove_net(nl.find_net("bc").unwrap());

        // Dead entities: outpad c, block b (no fanout), then block a and
        // net ab as the chain unravels.
        let removed = sweep_iterative(&mut nl, SweepOptions::default());
        assert_eq!(removed, 4);
        assert_eq!(nl.blocks().count(), 0);
        assert_eq!(nl.nets().count(), 0);

        // Idempotent: a second run removes nothing.
        assert_eq!(sweep_iterative(&mut nl, SweepOptions::default()), 0);
    }

    #[test]
    fn sweep_respects_options() {
        let lib = lib();
        let mut nl = AtomNetlist::new("top");
        let (_pi, _pin) = add_inpad(&mut nl, &lib, "a");
        let opts = SweepOptions {
            sweep_ios: false,
            ..SweepOptions::default()
        };
        assert_eq!(sweep_iterative(&mut nl, opts), 0);
        assert_eq!(nl.blocks().count(), 1);
        assert_eq!(sweep_iterative(&mut nl, SweepOptions::default()), 1);
        assert_eq!(nl.blocks().count(), 0);
    }
}
