//! Resolution of cluster-internal pin-name expressions.
//!
//! A packed netlist names the upstream source of an internal pin with an
//! expression of the form `node.port[bit]` or `node[slot].port[bit]`,
//! optionally followed by `->interconnect`. The node part is either the
//! context node's own type name (its ports) or the name of a child pb type
//! in the context node's selected mode. Resolution yields the unique
//! matching pin and its flat `pin_count_in_cluster` index, plus the
//! outgoing edge matching the interconnect name when one is given.

use fabric_arch::{PbGraph, PbGraphNodeId, PbGraphPinId};

/// A resolver failure; converted to a loader error (with file and line) at
/// the ingest call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The expression does not follow `node[slot].port[bit]` syntax.
    Malformed {
        /// The offending expression.
        expr: String,
    },
    /// No pin in the context matches the expression.
    UnknownPin {
        /// The offending expression.
        expr: String,
    },
    /// The pin exists but has no outgoing edge with the given
    /// interconnect name.
    UnknownInterconnect {
        /// The interconnect name that failed to match.
        interconnect: String,
        /// The pin part of the expression.
        pin: String,
    },
}

/// A successfully resolved pin expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPin {
    /// The matching pin.
    pub pin: PbGraphPinId,
    /// The pin's flat index within the cluster.
    pub pin_count_in_cluster: u32,
    /// Index of the matching outgoing edge when the expression named an
    /// interconnect.
    pub edge: Option<usize>,
}

/// Resolves a pin expression against a context node and its selected mode.
pub fn resolve_pin_expr(
    graph: &PbGraph,
    context: PbGraphNodeId,
    context_mode: usize,
    expr: &str,
) -> Result<ResolvedPin, ResolveError> {
    let (pin_part, interconnect) = match expr.split_once("->") {
        Some((pin, ic)) => (pin, Some(ic)),
        None => (expr, None),
    };

    let (node_spec, port, bit) = split_pin_name(pin_part)
        .ok_or_else(|| ResolveError::Malformed {
            expr: expr.to_string(),
        })?;

    let node = resolve_node(graph, context, context_mode, node_spec).ok_or_else(|| {
        ResolveError::UnknownPin {
            expr: expr.to_string(),
        }
    })?;

    let pin = graph
        .find_pin(node, port, bit)
        .ok_or_else(|| ResolveError::UnknownPin {
            expr: expr.to_string(),
        })?;
    let pin_count_in_cluster = graph.pin(pin).pin_count_in_cluster;

    let edge = match interconnect {
        Some(name) => Some(
            graph
                .pin(pin)
                .edges
                .iter()
                .position(|e| e.interconnect == name)
                .ok_or_else(|| ResolveError::UnknownInterconnect {
                    interconnect: name.to_string(),
                    pin: pin_part.to_string(),
                })?,
        ),
        None => None,
    };

    Ok(ResolvedPin {
        pin,
        pin_count_in_cluster,
        edge,
    })
}

// Splits `node[slot].port[bit]` into its parts. The node spec (with its
// optional slot) is returned verbatim; the port bit defaults are not
// applied here.
fn split_pin_name(pin_part: &str) -> Option<(&str, &str, u32)> {
    let (node_spec, port_part) = match pin_part.split_once('.') {
        Some((node, port)) => (node, port),
        // A bare `port[bit]` resolves against the context node itself.
        None => ("", pin_part),
    };

    let open = port_part.find('[')?;
    let close = port_part.find(']')?;
    if close < open || close != port_part.len() - 1 {
        return None;
    }
    let port = &port_part[..open];
    let bit: u32 = port_part[open + 1..close].parse().ok()?;
    if port.is_empty() {
        return None;
    }
    Some((node_spec, port, bit))
}

// Resolves the node spec: empty or the context's own type name selects the
// context node; otherwise the name (with optional `[slot]`) selects a
// child of the context in its selected mode.
fn resolve_node(
    graph: &PbGraph,
    context: PbGraphNodeId,
    context_mode: usize,
    node_spec: &str,
) -> Option<PbGraphNodeId> {
    let ctx = graph.node(context);

    let (name, slot) = match node_spec.split_once('[') {
        Some((name, rest)) => {
            let slot: u32 = rest.strip_suffix(']')?.parse().ok()?;
            (name, slot)
        }
        None => (node_spec, 0),
    };

    if name.is_empty() || name == ctx.pb_type.name {
        return Some(context);
    }

    let mode = ctx.pb_type.modes.get(context_mode)?;
    let (child_index, _) = mode.find_child(name)?;
    ctx.children[context_mode][child_index]
        .get(slot as usize)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_arch::{Mode, PbChild, PbPort, PbType, PortKind};
    use std::sync::Arc;

    // clb { I[2] in, O[1] out } with mode "m" holding two lut { in[1], out[1] }.
    fn test_graph() -> PbGraph {
        let lut = Arc::new(PbType::leaf(
            "lut",
            "names",
            vec![
                PbPort::new("in", 1, PortKind::Input),
                PbPort::new("out", 1, PortKind::Output),
            ],
        ));
        let clb = Arc::new(PbType::composite(
            "clb",
            vec![
                PbPort::new("I", 2, PortKind::Input),
                PbPort::new("O", 1, PortKind::Output),
            ],
            vec![Mode::new(
                "m",
                vec![PbChild {
                    pb_type: lut,
                    count: 2,
                }],
            )],
        ));
        let mut graph = PbGraph::build(&clb);

        let root = graph.root();
        let lut0 = graph.node(root).children[0][0][0];
        let i0 = graph.find_pin(root, "I", 0).unwrap();
        let lut0_in = graph.find_pin(lut0, "in", 0).unwrap();
        let lut0_out = graph.find_pin(lut0, "out", 0).unwrap();
        let o0 = graph.find_pin(root, "O", 0).unwrap();
        graph.add_edge(i0, "crossbar", lut0_in);
        graph.add_edge(lut0_out, "direct", o0);
        graph
    }

    #[test]
    fn parent_port_resolves() {
        let graph = test_graph();
        let resolved = resolve_pin_expr(&graph, graph.root(), 0, "clb.I[1]").unwrap();
        assert_eq!(graph.pin(resolved.pin).port_name, "I");
        assert_eq!(graph.pin(resolved.pin).bit, 1);
        assert_eq!(resolved.pin_count_in_cluster, 1);
        assert_eq!(resolved.edge, None);
    }

    #[test]
    fn bare_port_resolves_against_context() {
        let graph = test_graph();
        let resolved = resolve_pin_expr(&graph, graph.root(), 0, "I[0]").unwrap();
        assert_eq!(resolved.pin_count_in_cluster, 0);
    }

    #[test]
    fn child_port_with_slot_resolves() {
        let graph = test_graph();
        let lut1 = graph.node(graph.root()).children[0][0][1];
        let resolved = resolve_pin_expr(&graph, graph.root(), 0, "lut[1].out[0]").unwrap();
        assert_eq!(graph.pin(resolved.pin).node, lut1);
    }

    #[test]
    fn child_slot_defaults_to_zero() {
        let graph = test_graph();
        let lut0 = graph.node(graph.root()).children[0][0][0];
        let resolved = resolve_pin_expr(&graph, graph.root(), 0, "lut.out[0]").unwrap();
        assert_eq!(graph.pin(resolved.pin).node, lut0);
    }

    #[test]
    fn interconnect_edge_matches() {
        let graph = test_graph();
        let resolved = resolve_pin_expr(&graph, graph.root(), 0, "clb.I[0]->crossbar").unwrap();
        assert_eq!(resolved.edge, Some(0));
        assert_eq!(resolved.pin_count_in_cluster, 0);
    }

    #[test]
    fn unknown_interconnect_rejected() {
        let graph = test_graph();
        let err = resolve_pin_expr(&graph, graph.root(), 0, "clb.I[0]->shuffle").unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownInterconnect {
                interconnect: "shuffle".into(),
                pin: "clb.I[0]".into(),
            }
        );
    }

    #[test]
    fn unknown_port_rejected() {
        let graph = test_graph();
        let err = resolve_pin_expr(&graph, graph.root(), 0, "clb.Z[0]").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownPin { .. }));
    }

    #[test]
    fn out_of_range_bit_rejected() {
        let graph = test_graph();
        let err = resolve_pin_expr(&graph, graph.root(), 0, "clb.I[2]").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownPin { .. }));
    }

    #[test]
    fn out_of_range_slot_rejected() {
        let graph = test_graph();
        let err = resolve_pin_expr(&graph, graph.root(), 0, "lut[5].out[0]").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownPin { .. }));
    }

    #[test]
    fn malformed_expression_rejected() {
        let graph = test_graph();
        for expr in ["clb.I", "clb.[0]", "clb.I[x]", "clb.I[0]extra"] {
            let err = resolve_pin_expr(&graph, graph.root(), 0, expr).unwrap_err();
            assert!(matches!(err, ResolveError::Malformed { .. }), "{expr}");
        }
    }
}
