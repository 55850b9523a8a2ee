//! Human-readable dump of the atom netlist, for debugging.

use crate::ids::AtomBlockId;
use crate::netlist::{AtomNetlist, BlockType};
use fabric_arch::PortKind;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Writes every block (grouped by kind) and every net with its driver and
/// sinks.
pub fn write_netlist_dump<W: Write>(netlist: &AtomNetlist, f: &mut W) -> io::Result<()> {
    // Grouping by kind keeps pads, LUTs, and sequential blocks together.
    let mut blocks_by_type: BTreeMap<BlockType, Vec<AtomBlockId>> = BTreeMap::new();
    for blk in netlist.blocks() {
        blocks_by_type
            .entry(netlist.block_type(blk))
            .or_default()
            .push(blk);
    }

    for (ty, blocks) in &blocks_by_type {
        for &blk in blocks {
            let kind = match ty {
                BlockType::Inpad => "INPAD",
                BlockType::Outpad => "OUTPAD",
                BlockType::Combinational => "COMBINATIONAL",
                BlockType::Sequential => "SEQUENTIAL",
            };
            writeln!(
                f,
                "Block '{}' ({kind}): {}",
                netlist.block_model(blk).name,
                netlist.block_name(blk)
            )?;

            for port in netlist.block_ports(blk) {
                let (label, arrow) = match netlist.port_type(port) {
                    PortKind::Input => ("Input", "<-"),
                    PortKind::Output => ("Output", "->"),
                    PortKind::Clock => ("Clock", "<-"),
                };
                let pins = netlist.port_pins(port);
                writeln!(f, "\t{label} ({} bits)", pins.len())?;
                for (bit, &pin) in pins.iter().enumerate() {
                    let net_name = netlist
                        .pin_net(pin)
                        .map(|n| netlist.net_name(n))
                        .unwrap_or("");
                    writeln!(
                        f,
                        "\t\t{} [{bit}] {arrow} {net_name}",
                        netlist.port_name(port)
                    )?;
                }
            }
        }
    }

    for net in netlist.nets() {
        let sinks = netlist.net_sinks(net);
        writeln!(
            f,
            "Net '{}' (fanout {})",
            netlist.net_name(net),
            sinks.len()
        )?;

        match netlist.net_driver(net) {
            Some(driver) => {
                writeln!(
                    f,
                    "\tDriver Block: '{}' Driver Pin: '{}[{}]'",
                    netlist.block_name(netlist.pin_block(driver)),
                    netlist.port_name(netlist.pin_port(driver)),
                    netlist.pin_port_bit(driver)
                )?;
            }
            None => writeln!(f, "\tNo Driver")?,
        }
        for &sink in sinks {
            writeln!(
                f,
                "\tSink Block: '{}' Sink Pin: '{}[{}]'",
                netlist.block_name(netlist.pin_block(sink)),
                netlist.port_name(netlist.pin_port(sink)),
                netlist.pin_port_bit(sink)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_arch::{ModelLibrary, MODEL_INPUT, MODEL_NAMES};

    #[test]
    fn dump_lists_blocks_and_nets() {
        let lib = ModelLibrary::with_builtins();
        let mut nl = AtomNetlist::new("top");
        let pi = nl
            .add_block("a", BlockType::Inpad, lib.find(MODEL_INPUT).unwrap(), None)
            .unwrap();
        nl.add_port(pi, "inpad", PortKind::Output, 1);
        let lut = nl
            .add_block(
                "f",
                BlockType::Combinational,
                lib.find(MODEL_NAMES).unwrap(),
                None,
            )
            .unwrap();
        nl.add_port(lut, "in", PortKind::Input, 1);
        nl.add_port(lut, "out", PortKind::Output, 1);
        let pi_out = nl.block_output_pins(pi).next().unwrap();
        let lut_in = nl.block_input_pins(lut).next().unwrap();
        nl.add_net("a", Some(pi_out), vec![lut_in]).unwrap();

        let mut buf = Vec::new();
        write_netlist_dump(&nl, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Block 'input' (INPAD): a"));
        assert!(text.contains("Block 'names' (COMBINATIONAL): f"));
        assert!(text.contains("Net 'a' (fanout 1)"));
        assert!(text.contains("\tDriver Block: 'a' Driver Pin: 'inpad[0]'"));
        assert!(text.contains("\tSink Block: 'f' Sink Pin: 'in[0]'"));
        // The LUT output pin is unconnected.
        assert!(text.contains("out [0] -> \n"));
    }

    #[test]
    fn driverless_net_dump() {
        let lib = ModelLibrary::with_builtins();
        let mut nl = AtomNetlist::new("top");
        let lut = nl
            .add_block(
                "f",
                BlockType::Combinational,
                lib.find(MODEL_NAMES).unwrap(),
                None,
            )
            .unwrap();
        nl.add_port(lut, "in", PortKind::Input, 1);
        let lut_in = nl.block_input_pins(lut).next().unwrap();
        nl.add_net("floating", None, vec![lut_in]).unwrap();

        let mut buf = Vec::new();
        write_netlist_dump(&nl, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Net 'floating' (fanout 1)"));
        assert!(text.contains("\tNo Driver"));
    }
}
