//! Constant-generator identification and cross-checking.

use fabric_conformance::{const_gen_atoms, const_gen_doc, demo_architecture};
use fabric_pack::{read_packed_netlist, PackError};

// A zero-input cover is a constant generator; its output pin is flagged
// constant by the gate-level reader and the loader's check passes.
#[test]
fn marked_constant_generator_passes() {
    let arch = demo_architecture();
    let atoms = const_gen_atoms(&arch, true);
    let (clusters, _) =
        read_packed_netlist(const_gen_doc(), "vcc.net", &arch, &atoms).unwrap();

    let net = atoms.find_net("vcc").unwrap();
    let driver = atoms.net_driver(net).unwrap();
    assert!(atoms.pin_is_constant(driver));
    assert!(atoms.net_is_constant(net));
    assert!(clusters.find_ext_net("vcc").is_some());
}

#[test]
fn unmarked_constant_generator_is_rejected() {
    let arch = demo_architecture();
    let atoms = const_gen_atoms(&arch, false);
    let err = read_packed_netlist(const_gen_doc(), "vcc.net", &arch, &atoms).unwrap_err();
    assert!(matches!(err, PackError::Consistency { .. }), "{err}");
    let message = err.to_string();
    assert!(message.contains("vcc"), "{message}");
    assert!(message.contains("constant"), "{message}");
}
