//! Conformance test fixtures for the fabric netlist loader.
//!
//! Provides a small demo device model (an `io` pad tile and a `clb` with
//! one LUT/FF BLE), atom-netlist builders matching the test circuits, and
//! packed-netlist document builders. Integration tests in `tests/` drive
//! the full ingest pipeline over these fixtures.

#![warn(missing_docs)]

use fabric_arch::{
    Architecture, ClusterType, Mode, ModelLibrary, PbChild, PbPort, PbType, PortKind,
    MODEL_INPUT, MODEL_LATCH, MODEL_NAMES, MODEL_OUTPUT,
};
use fabric_atom::{AtomBlockId, AtomNetlist, BlockType, Logic, TruthTable};
use std::sync::Arc;

/// Builds the demo device model.
///
/// Two cluster types:
///
/// - `io` (1 input pin `I`, 1 output pin `O`) with an `inpad` mode and an
///   `outpad` mode, each holding the matching pad primitive.
/// - `clb` (`I[2]`, `O[1]`, global `clk[1]`) with one `ble` containing a
///   2-input LUT and a flip-flop, a shared input crossbar, and output
///   muxing from either the LUT or the FF.
pub fn demo_architecture() -> Architecture {
    let mut arch = Architecture::new(ModelLibrary::with_builtins());

    // io tile.
    let inpad = Arc::new(PbType::leaf(
        "inpad",
        MODEL_INPUT,
        vec![PbPort::new("inpad", 1, PortKind::Output)],
    ));
    let outpad = Arc::new(PbType::leaf(
        "outpad",
        MODEL_OUTPUT,
        vec![PbPort::new("outpad", 1, PortKind::Input)],
    ));
    let io = Arc::new(PbType::composite(
        "io",
        vec![
            PbPort::new("I", 1, PortKind::Input),
            PbPort::new("O", 1, PortKind::Output),
        ],
        vec![
            Mode::new(
                "inpad",
                vec![PbChild {
                    pb_type: inpad,
                    count: 1,
                }],
            ),
            Mode::new(
                "outpad",
                vec![PbChild {
                    pb_type: outpad,
                    count: 1,
                }],
            ),
        ],
    ));
    let mut io_ty = ClusterType::new(io, 1, &[]);
    {
        let g = &mut io_ty.pb_graph;
        let root = g.root();
        let inpad_node = g.node(root).children[0][0][0];
        let outpad_node = g.node(root).children[1][0][0];
        let i0 = g.find_pin(root, "I", 0).unwrap();
        let o0 = g.find_pin(root, "O", 0).unwrap();
        let inpad_out = g.find_pin(inpad_node, "inpad", 0).unwrap();
        let outpad_in = g.find_pin(outpad_node, "outpad", 0).unwrap();
        g.add_edge(inpad_out, "inpad_to_O", o0);
        g.add_edge(i0, "I_to_outpad", outpad_in);
    }
    arch.add_cluster_type(io_ty);

    // clb tile.
    let lut = Arc::new(PbType::leaf(
        "lut",
        MODEL_NAMES,
        vec![
            PbPort::new("in", 2, PortKind::Input),
            PbPort::new("out", 1, PortKind::Output),
        ],
    ));
    let ff = Arc::new(PbType::leaf(
        "ff",
        MODEL_LATCH,
        vec![
            PbPort::new("D", 1, PortKind::Input),
            PbPort::new("Q", 1, PortKind::Output),
            PbPort::new("clk", 1, PortKind::Clock),
        ],
    ));
    let ble = Arc::new(PbType::composite(
        "ble",
        vec![
            PbPort::new("in", 2, PortKind::Input),
            PbPort::new("out", 1, PortKind::Output),
            PbPort::new("clk", 1, PortKind::Clock),
        ],
        vec![Mode::new(
            "default",
            vec![
                PbChild {
                    pb_type: lut,
                    count: 1,
                },
                PbChild {
                    pb_type: ff,
                    count: 1,
                },
            ],
        )],
    ));
    let clb = Arc::new(PbType::composite(
        "clb",
        vec![
            PbPort::new("I", 2, PortKind::Input),
            PbPort::new("O", 1, PortKind::Output),
            PbPort::new("clk", 1, PortKind::Clock),
        ],
        vec![Mode::new(
            "default",
            vec![PbChild {
                pb_type: ble,
                count: 1,
            }],
        )],
    ));
    let mut clb_ty = ClusterType::new(clb, 1, &["clk"]);
    {
        let g = &mut clb_ty.pb_graph;
        let root = g.root();
        let ble_node = g.node(root).children[0][0][0];
        let lut_node = g.node(ble_node).children[0][0][0];
        let ff_node = g.node(ble_node).children[0][1][0];

        let clb_i = [
            g.find_pin(root, "I", 0).unwrap(),
            g.find_pin(root, "I", 1).unwrap(),
        ];
        let clb_o = g.find_pin(root, "O", 0).unwrap();
        let clb_clk = g.find_pin(root, "clk", 0).unwrap();
        let ble_in = [
            g.find_pin(ble_node, "in", 0).unwrap(),
            g.find_pin(ble_node, "in", 1).unwrap(),
        ];
        let ble_out = g.find_pin(ble_node, "out", 0).unwrap();
        let ble_clk = g.find_pin(ble_node, "clk", 0).unwrap();
        let lut_in = [
            g.find_pin(lut_node, "in", 0).unwrap(),
            g.find_pin(lut_node, "in", 1).unwrap(),
        ];
        let lut_out = g.find_pin(lut_node, "out", 0).unwrap();
        let ff_d = g.find_pin(ff_node, "D", 0).unwrap();
        let ff_q = g.find_pin(ff_node, "Q", 0).unwrap();
        let ff_clk = g.find_pin(ff_node, "clk", 0).unwrap();

        g.add_edge(clb_i[0], "crossbar", ble_in[0]);
        g.add_edge(clb_i[1], "crossbar", ble_in[1]);
        g.add_edge(clb_clk, "clk_tree", ble_clk);
        g.add_edge(ble_in[0], "lut_in", lut_in[0]);
        g.add_edge(ble_in[1], "lut_in", lut_in[1]);
        g.add_edge(ble_in[1], "ble_to_ff", ff_d);
        g.add_edge(ble_clk, "ble_clk", ff_clk);
        g.add_edge(lut_out, "lut_to_ff", ff_d);
        g.add_edge(lut_out, "lut_out", ble_out);
        g.add_edge(ff_q, "ff_out", ble_out);
        g.add_edge(ble_out, "clb_out", clb_o);
    }
    arch.add_cluster_type(clb_ty);
    arch
}

/// Adds a primary-input pad block named `name`.
pub fn add_inpad(netlist: &mut AtomNetlist, arch: &Architecture, name: &str) -> AtomBlockId {
    let blk = netlist
        .add_block(
            name,
            BlockType::Inpad,
            arch.models.find(MODEL_INPUT).unwrap(),
            None,
        )
        .unwrap();
    netlist.add_port(blk, "inpad", PortKind::Output, 1);
    blk
}

/// Adds a primary-output pad block named `name` (conventionally `out:...`).
pub fn add_outpad(netlist: &mut AtomNetlist, arch: &Architecture, name: &str) -> AtomBlockId {
    let blk = netlist
        .add_block(
            name,
            BlockType::Outpad,
            arch.models.find(MODEL_OUTPUT).unwrap(),
            None,
        )
        .unwrap();
    netlist.add_port(blk, "outpad", PortKind::Input, 1);
    blk
}

/// Adds a single-output cover block with `num_inputs` inputs.
pub fn add_names(
    netlist: &mut AtomNetlist,
    arch: &Architecture,
    name: &str,
    num_inputs: u32,
    table: TruthTable,
) -> AtomBlockId {
    let blk = netlist
        .add_block(
            name,
            BlockType::Combinational,
            arch.models.find(MODEL_NAMES).unwrap(),
            Some(table),
        )
        .unwrap();
    if num_inputs > 0 {
        netlist.add_port(blk, "in", PortKind::Input, num_inputs);
    }
    netlist.add_port(blk, "out", PortKind::Output, 1);
    blk
}

/// Adds a latch block with an unknown initial state.
pub fn add_latch(netlist: &mut AtomNetlist, arch: &Architecture, name: &str) -> AtomBlockId {
    let blk = netlist
        .add_block(
            name,
            BlockType::Sequential,
            arch.models.find(MODEL_LATCH).unwrap(),
            Some(vec![vec![Logic::Unknown]]),
        )
        .unwrap();
    netlist.add_port(blk, "D", PortKind::Input, 1);
    netlist.add_port(blk, "clk", PortKind::Clock, 1);
    netlist.add_port(blk, "Q", PortKind::Output, 1);
    blk
}

/// First connected output pin of a block.
pub fn output_pin(netlist: &AtomNetlist, blk: AtomBlockId) -> fabric_atom::AtomPinId {
    netlist.block_output_pins(blk).next().unwrap()
}

/// First input pin of a block.
pub fn input_pin(netlist: &AtomNetlist, blk: AtomBlockId) -> fabric_atom::AtomPinId {
    netlist.block_input_pins(blk).next().unwrap()
}

/// Atom netlist for the identity circuit: pad `a`, buffer LUT `y`, pad
/// `out:y`.
pub fn identity_atoms(arch: &Architecture) -> AtomNetlist {
    let mut nl = AtomNetlist::new("top");
    let a = add_inpad(&mut nl, arch, "a");
    let lut = add_names(
        &mut nl,
        arch,
        "y",
        1,
        vec![vec![Logic::True, Logic::True]],
    );
    let po = add_outpad(&mut nl, arch, "out:y");

    let a_out = output_pin(&nl, a);
    let lut_in = input_pin(&nl, lut);
    let lut_out = output_pin(&nl, lut);
    let po_in = input_pin(&nl, po);
    nl.add_net("a", Some(a_out), vec![lut_in]).unwrap();
    nl.add_net("y", Some(lut_out), vec![po_in]).unwrap();
    nl
}

/// Packed-netlist document for [`identity_atoms`]: `a` through an io
/// inpad, the buffer LUT in a clb, `y` through an io outpad.
pub fn identity_doc() -> &'static str {
    r#"<block name="top" instance="FPGA_packed_netlist[0]">
  <inputs>a</inputs>
  <outputs>y</outputs>
  <clocks></clocks>
  <block name="a" instance="io[0]" mode="inpad">
    <inputs><port name="I">open</port></inputs>
    <outputs><port name="O">inpad.inpad[0]->inpad_to_O</port></outputs>
    <clocks></clocks>
    <block name="a" instance="inpad[0]">
      <inputs></inputs>
      <outputs><port name="inpad">a</port></outputs>
      <clocks></clocks>
    </block>
  </block>
  <block name="out:y" instance="io[1]" mode="outpad">
    <inputs><port name="I">y</port></inputs>
    <outputs><port name="O">open</port></outputs>
    <clocks></clocks>
    <block name="out:y" instance="outpad[0]">
      <inputs><port name="outpad">io.I[0]->I_to_outpad</port></inputs>
      <outputs></outputs>
      <clocks></clocks>
    </block>
  </block>
  <block name="clb_0" instance="clb[2]" mode="default">
    <inputs><port name="I">a open</port></inputs>
    <outputs><port name="O">ble.out[0]->clb_out</port></outputs>
    <clocks><port name="clk">open</port></clocks>
    <block name="ble_0" instance="ble[0]" mode="default">
      <inputs><port name="in">clb.I[0]->crossbar open</port></inputs>
      <outputs><port name="out">lut.out[0]->lut_out</port></outputs>
      <clocks><port name="clk">open</port></clocks>
      <block name="y" instance="lut[0]">
        <inputs><port name="in">ble.in[0]->lut_in open</port></inputs>
        <outputs><port name="out">y</port></outputs>
        <clocks></clocks>
      </block>
      <block name="open" instance="ff[0]"/>
    </block>
  </block>
</block>
"#
}

/// Atom netlist for the mixed-global circuit: `clk` feeds both an FF
/// clock pin and a LUT data input.
pub fn mixed_global_atoms(arch: &Architecture) -> AtomNetlist {
    let mut nl = AtomNetlist::new("top");
    let clk = add_inpad(&mut nl, arch, "clk");
    let d = add_inpad(&mut nl, arch, "d");
    let ff = add_latch(&mut nl, arch, "q");
    let lut = add_names(
        &mut nl,
        arch,
        "g",
        1,
        vec![vec![Logic::False, Logic::True]],
    );
    let po_q = add_outpad(&mut nl, arch, "out:q");
    let po_g = add_outpad(&mut nl, arch, "out:g");

    let ff_clk = nl.block_clock_pins(ff).next().unwrap();
    let lut_in = input_pin(&nl, lut);
    nl.add_net("clk", Some(output_pin(&nl, clk)), vec![ff_clk, lut_in])
        .unwrap();
    nl.add_net("d", Some(output_pin(&nl, d)), vec![input_pin(&nl, ff)])
        .unwrap();
    let ff_q = output_pin(&nl, ff);
    nl.add_net("q", Some(ff_q), vec![input_pin(&nl, po_q)])
        .unwrap();
    nl.add_net("g", Some(output_pin(&nl, lut)), vec![input_pin(&nl, po_g)])
        .unwrap();
    nl
}

/// Packed-netlist document for [`mixed_global_atoms`]. The `clk` net
/// reaches a global clb clock pin and a non-global clb input pin.
pub fn mixed_global_doc() -> &'static str {
    r#"<block name="top" instance="FPGA_packed_netlist[0]">
  <inputs>clk d</inputs>
  <outputs>q g</outputs>
  <clocks>clk</clocks>
  <block name="clk" instance="io[0]" mode="inpad">
    <inputs><port name="I">open</port></inputs>
    <outputs><port name="O">inpad.inpad[0]->inpad_to_O</port></outputs>
    <clocks></clocks>
    <block name="clk" instance="inpad[0]">
      <inputs></inputs>
      <outputs><port name="inpad">clk</port></outputs>
      <clocks></clocks>
    </block>
  </block>
  <block name="d" instance="io[1]" mode="inpad">
    <inputs><port name="I">open</port></inputs>
    <outputs><port name="O">inpad.inpad[0]->inpad_to_O</port></outputs>
    <clocks></clocks>
    <block name="d" instance="inpad[0]">
      <inputs></inputs>
      <outputs><port name="inpad">d</port></outputs>
      <clocks></clocks>
    </block>
  </block>
  <block name="out:q" instance="io[2]" mode="outpad">
    <inputs><port name="I">q</port></inputs>
    <outputs><port name="O">open</port></outputs>
    <clocks></clocks>
    <block name="out:q" instance="outpad[0]">
      <inputs><port name="outpad">io.I[0]->I_to_outpad</port></inputs>
      <outputs></outputs>
      <clocks></clocks>
    </block>
  </block>
  <block name="out:g" instance="io[3]" mode="outpad">
    <inputs><port name="I">g</port></inputs>
    <outputs><port name="O">open</port></outputs>
    <clocks></clocks>
    <block name="out:g" instance="outpad[0]">
      <inputs><port name="outpad">io.I[0]->I_to_outpad</port></inputs>
      <outputs></outputs>
      <clocks></clocks>
    </block>
  </block>
  <block name="clb_g" instance="clb[4]" mode="default">
    <inputs><port name="I">clk open</port></inputs>
    <outputs><port name="O">ble.out[0]->clb_out</port></outputs>
    <clocks><port name="clk">open</port></clocks>
    <block name="ble_g" instance="ble[0]" mode="default">
      <inputs><port name="in">clb.I[0]->crossbar open</port></inputs>
      <outputs><port name="out">lut.out[0]->lut_out</port></outputs>
      <clocks><port name="clk">open</port></clocks>
      <block name="g" instance="lut[0]">
        <inputs><port name="in">ble.in[0]->lut_in open</port></inputs>
        <outputs><port name="out">g</port></outputs>
        <clocks></clocks>
      </block>
      <block name="open" instance="ff[0]"/>
    </block>
  </block>
  <block name="clb_q" instance="clb[5]" mode="default">
    <inputs><port name="I">open d</port></inputs>
    <outputs><port name="O">ble.out[0]->clb_out</port></outputs>
    <clocks><port name="clk">clk</port></clocks>
    <block name="ble_q" instance="ble[0]" mode="default">
      <inputs><port name="in">open clb.I[1]->crossbar</port></inputs>
      <outputs><port name="out">ff.Q[0]->ff_out</port></outputs>
      <clocks><port name="clk">clb.clk[0]->clk_tree</port></clocks>
      <block name="open" instance="lut[0]"/>
      <block name="q" instance="ff[0]">
        <inputs><port name="D">ble.in[1]->ble_to_ff</port></inputs>
        <outputs><port name="Q">q</port></outputs>
        <clocks><port name="clk">ble.clk[0]->ble_clk</port></clocks>
      </block>
    </block>
  </block>
</block>
"#
}

/// Atom netlist for the constant-generator circuit: a zero-input cover
/// `vcc` feeding pad `out:vcc`.
///
/// When `mark_constant` is set, the cover's output pin is flagged constant
/// (as the gate-level reader would).
pub fn const_gen_atoms(arch: &Architecture, mark_constant: bool) -> AtomNetlist {
    let mut nl = AtomNetlist::new("top");
    let vcc = add_names(&mut nl, arch, "vcc", 0, vec![vec![Logic::True]]);
    let po = add_outpad(&mut nl, arch, "out:vcc");
    let vcc_out = output_pin(&nl, vcc);
    nl.add_net("vcc", Some(vcc_out), vec![input_pin(&nl, po)])
        .unwrap();
    if mark_constant {
        nl.set_pin_is_constant(vcc_out, true);
    }
    nl
}

/// Packed-netlist document for [`const_gen_atoms`].
pub fn const_gen_doc() -> &'static str {
    r#"<block name="top" instance="FPGA_packed_netlist[0]">
  <inputs></inputs>
  <outputs>vcc</outputs>
  <clocks></clocks>
  <block name="clb_vcc" instance="clb[0]" mode="default">
    <inputs><port name="I">open open</port></inputs>
    <outputs><port name="O">ble.out[0]->clb_out</port></outputs>
    <clocks><port name="clk">open</port></clocks>
    <block name="ble_vcc" instance="ble[0]" mode="default">
      <inputs><port name="in">open open</port></inputs>
      <outputs><port name="out">lut.out[0]->lut_out</port></outputs>
      <clocks><port name="clk">open</port></clocks>
      <block name="vcc" instance="lut[0]">
        <inputs><port name="in">open open</port></inputs>
        <outputs><port name="out">vcc</port></outputs>
        <clocks></clocks>
      </block>
      <block name="open" instance="ff[0]"/>
    </block>
  </block>
  <block name="out:vcc" instance="io[1]" mode="outpad">
    <inputs><port name="I">vcc</port></inputs>
    <outputs><port name="O">open</port></outputs>
    <clocks></clocks>
    <block name="out:vcc" instance="outpad[0]">
      <inputs><port name="outpad">io.I[0]->I_to_outpad</port></inputs>
      <outputs></outputs>
      <clocks></clocks>
    </block>
  </block>
</block>
"#
}

/// The identity document with the LUT slot claimed twice.
pub fn duplicate_slot_doc() -> String {
    identity_doc().replace(
        r#"<block name="open" instance="ff[0]"/>"#,
        r#"<block name="z" instance="lut[0]">
        <inputs><port name="in">open open</port></inputs>
        <outputs><port name="out">open</port></outputs>
        <clocks></clocks>
      </block>"#,
    )
}
