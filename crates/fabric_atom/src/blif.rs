//! Gate-level (BLIF) emission of the atom netlist.
//!
//! Writes the canonical textual form: `.model`, `.inputs` / `.outputs`,
//! `.latch`, `.names`, `.subckt`, `.end`, followed by black-box `.model`
//! declarations for every distinct non-builtin primitive model. The format
//! requires a primary output to be driven by a net of the same name, so an
//! artificial identity LUT is emitted wherever the netlist disagrees.

use crate::ids::AtomBlockId;
use crate::logic::Logic;
use crate::netlist::{AtomNetlist, BlockType};
use fabric_arch::{Model, MODEL_INPUT, MODEL_LATCH, MODEL_NAMES, MODEL_OUTPUT};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

const INDENT: &str = "    ";

/// The prefix the gate-level reader adds to primary-output block names.
pub const OUTPAD_NAME_PREFIX: &str = "out:";

/// Writes the netlist in gate-level textual form.
pub fn write_blif<W: Write>(netlist: &AtomNetlist, writer: &mut W) -> io::Result<()> {
    let mut f = BufWriter::new(writer);
    let mut unconn_count = 0usize;

    writeln!(f, "#Atom netlist generated by fabric")?;
    writeln!(f, ".model {}", netlist.netlist_name())?;

    write_inputs(netlist, &mut f)?;
    write_outputs(netlist, &mut f)?;
    write_latches(netlist, &mut f)?;
    write_names(netlist, &mut f)?;
    let subckt_models = write_subckts(netlist, &mut f, &mut unconn_count)?;

    writeln!(f, ".end")?;
    writeln!(f)?;

    for model in subckt_models.values() {
        write_blackbox_model(model, &mut f)?;
    }
    f.flush()
}

fn write_inputs<W: Write>(netlist: &AtomNetlist, f: &mut W) -> io::Result<()> {
    let inputs: Vec<AtomBlockId> = netlist
        .blocks()
        .filter(|&blk| netlist.block_type(blk) == BlockType::Inpad)
        .collect();

    writeln!(f, ".inputs \\")?;
    for (i, &blk) in inputs.iter().enumerate() {
        write!(f, "{INDENT}{}", netlist.block_name(blk))?;
        if i != inputs.len() - 1 {
            writeln!(f, " \\")?;
        }
    }
    writeln!(f)
}

fn write_outputs<W: Write>(netlist: &AtomNetlist, f: &mut W) -> io::Result<()> {
    let outputs: Vec<AtomBlockId> = netlist
        .blocks()
        .filter(|&blk| netlist.block_type(blk) == BlockType::Outpad)
        .collect();

    writeln!(f, ".outputs \\")?;
    // The format requires primary outputs to be driven by same-named nets,
    // which the store does not enforce; a name change is expressed with an
    // identity buffer.
    let mut buffers_required: BTreeSet<(String, String)> = BTreeSet::new();
    for (i, &blk) in outputs.iter().enumerate() {
        let pins: Vec<_> = netlist.block_pins(blk).collect();
        assert_eq!(pins.len(), 1, "outpad has a single pin");

        let blk_name = netlist.block_name(blk);
        let out_name = blk_name
            .strip_prefix(OUTPAD_NAME_PREFIX)
            .unwrap_or(blk_name)
            .to_string();
        write!(f, "{INDENT}{out_name}")?;

        if let Some(net) = netlist.pin_net(pins[0]) {
            let net_name = netlist.net_name(net);
            if net_name != out_name {
                buffers_required.insert((net_name.to_string(), out_name));
            }
        }

        if i != outputs.len() - 1 {
            writeln!(f, " \\")?;
        }
    }
    writeln!(f)?;
    writeln!(f)?;

    for (net_name, out_name) in buffers_required {
        writeln!(f, "#Artificially inserted primary-output assigment buffer")?;
        writeln!(f, ".names {net_name} {out_name}")?;
        writeln!(f, "1 1")?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_latches<W: Write>(netlist: &AtomNetlist, f: &mut W) -> io::Result<()> {
    for blk in netlist.blocks() {
        if netlist.block_type(blk) != BlockType::Sequential {
            continue;
        }
        if netlist.block_model(blk).name != MODEL_LATCH {
            continue;
        }

        let mut d_net = String::new();
        let mut q_net = String::new();
        let mut clk_net = String::new();
        for port in netlist.block_ports(blk) {
            let pins = netlist.port_pins(port);
            assert_eq!(pins.len(), 1, "latch ports are single-bit");
            let net = netlist
                .pin_net(pins[0])
                .expect("latch pins are all connected");
            let net_name = netlist.net_name(net).to_string();
            match netlist.port_name(port) {
                "D" => d_net = net_name,
                "Q" => q_net = net_name,
                "clk" => clk_net = net_name,
                other => panic!("unrecognized latch port '{other}'"),
            }
        }

        // Rising edge is the only supported latch type. The initial value
        // is stored as a single-cell truth table.
        let table = netlist
            .block_truth_table(blk)
            .expect("latch carries an initial-state table");
        assert_eq!(table.len(), 1, "latch table has one row");
        assert_eq!(table[0].len(), 1, "latch table has one column");
        let init_val = match table[0][0] {
            Logic::True => 1,
            Logic::False => 0,
            Logic::DontCare => 2,
            Logic::Unknown => 3,
        };

        writeln!(f, ".latch {d_net} {q_net} re {clk_net} {init_val}")?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_names<W: Write>(netlist: &AtomNetlist, f: &mut W) -> io::Result<()> {
    for blk in netlist.blocks() {
        if netlist.block_type(blk) != BlockType::Combinational {
            continue;
        }
        if netlist.block_model(blk).name != MODEL_NAMES {
            continue;
        }

        assert!(netlist.block_input_ports(blk).count() <= 1);
        let mut net_names: Vec<String> = Vec::new();
        for pin in netlist.block_input_pins(blk) {
            let net = netlist.pin_net(pin).expect("cover inputs are connected");
            net_names.push(netlist.net_name(net).to_string());
        }
        let out_pins: Vec<_> = netlist.block_output_pins(blk).collect();
        assert_eq!(out_pins.len(), 1, "cover has a single output pin");
        let out_net = netlist
            .pin_net(out_pins[0])
            .expect("cover output is connected");
        net_names.push(netlist.net_name(out_net).to_string());

        writeln!(f, ".names {}", net_names.join(" "))?;

        let table = netlist.block_truth_table(blk).expect("cover has a table");
        for row in table {
            for (i, value) in row.iter().enumerate() {
                if i == row.len() - 1 {
                    write!(f, " ")?;
                }
                match value {
                    Logic::True => write!(f, "1")?,
                    Logic::False => write!(f, "0")?,
                    Logic::DontCare => write!(f, "-")?,
                    Logic::Unknown => panic!("invalid cover value in truth table"),
                }
            }
            writeln!(f)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn write_subckts<W: Write>(
    netlist: &AtomNetlist,
    f: &mut W,
    unconn_count: &mut usize,
) -> io::Result<BTreeMap<String, Arc<Model>>> {
    let mut subckt_models: BTreeMap<String, Arc<Model>> = BTreeMap::new();

    for blk in netlist.blocks() {
        let model = netlist.block_model(blk);
        if matches!(
            model.name.as_str(),
            MODEL_LATCH | MODEL_NAMES | MODEL_INPUT | MODEL_OUTPUT
        ) {
            continue;
        }
        subckt_models.insert(model.name.clone(), Arc::clone(model));

        let ports: Vec<_> = netlist.block_ports(blk).collect();
        writeln!(f, ".subckt {} \\", model.name)?;
        for (i, &port) in ports.iter().enumerate() {
            let width = netlist.port_width(port);
            assert!(width > 0);
            for j in 0..width {
                write!(f, "{INDENT}{}", netlist.port_name(port))?;
                if width != 1 {
                    write!(f, "[{j}]")?;
                }
                write!(f, "=")?;
                match netlist.port_net(port, j) {
                    Some(net) => write!(f, "{}", netlist.net_name(net))?,
                    None => write!(f, "{}", make_unconn(unconn_count))?,
                }
                if i != ports.len() - 1 || j != width - 1 {
                    writeln!(f, " \\")?;
                }
            }
        }
        writeln!(f)?;
        writeln!(f)?;
    }
    Ok(subckt_models)
}

fn write_blackbox_model<W: Write>(model: &Model, f: &mut W) -> io::Result<()> {
    writeln!(f, ".model {}", model.name)?;

    write!(f, ".inputs")?;
    for port in &model.inputs {
        write_model_port_bits(port.width, &port.name, f)?;
    }
    writeln!(f)?;

    write!(f, ".outputs")?;
    for port in &model.outputs {
        write_model_port_bits(port.width, &port.name, f)?;
    }
    writeln!(f)?;

    writeln!(f, ".blackbox")?;
    writeln!(f, ".end")?;
    writeln!(f)
}

fn write_model_port_bits<W: Write>(width: u32, name: &str, f: &mut W) -> io::Result<()> {
    if width == 1 {
        writeln!(f, " \\")?;
        write!(f, "{INDENT}{name}")?;
    } else {
        for i in 0..width {
            writeln!(f, " \\")?;
            write!(f, "{INDENT}{name}[{i}]")?;
        }
    }
    Ok(())
}

fn make_unconn(unconn_count: &mut usize) -> String {
    let name = format!("unconn{unconn_count}");
    *unconn_count += 1;
    name
}
