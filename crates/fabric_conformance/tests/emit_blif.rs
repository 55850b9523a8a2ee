//! Gate-level emission after a full ingest pass.

use fabric_atom::{sweep_iterative, write_blif, SweepOptions};
use fabric_conformance::{demo_architecture, identity_atoms, identity_doc, mixed_global_atoms};
use fabric_pack::read_packed_netlist;

fn emit(netlist: &fabric_atom::AtomNetlist) -> String {
    let mut buf = Vec::new();
    write_blif(netlist, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn identity_emits_cover_and_pads() {
    let arch = demo_architecture();
    let atoms = identity_atoms(&arch);
    read_packed_netlist(identity_doc(), "identity.net", &arch, &atoms).unwrap();

    let text = emit(&atoms);
    assert!(text.contains(".model top\n"));
    assert!(text.contains(".inputs \\\n    a\n"));
    assert!(text.contains(".outputs \\\n    y\n"));
    assert!(text.contains(".names a y\n1 1\n"));
    assert!(text.ends_with(".end\n\n"));
}

#[test]
fn latch_circuit_emits_latch_line() {
    let arch = demo_architecture();
    let atoms = mixed_global_atoms(&arch);
    // No ingest here: the packed document for this circuit mixes global
    // pins on purpose. Emission works from the atom netlist alone.
    let text = emit(&atoms);
    assert!(text.contains(".latch d q re clk 3\n"));
    assert!(text.contains(".names clk g\n0 1\n"));
}

// The ingested netlist is fully live, so sweeping is a no-op and emission
// is unchanged.
#[test]
fn sweep_is_noop_on_live_netlist() {
    let arch = demo_architecture();
    let mut atoms = identity_atoms(&arch);
    read_packed_netlist(identity_doc(), "identity.net", &arch, &atoms).unwrap();

    let before = emit(&atoms);
    assert_eq!(sweep_iterative(&mut atoms, SweepOptions::default()), 0);
    assert_eq!(emit(&atoms), before);
}
