//! Post-pack netlist loader for the fabric toolchain.
//!
//! This crate reconstructs a validated clustered netlist from a packed
//! netlist document: it matches every cluster-internal pin expression
//! against the architecture's pin graph, propagates atom-net identities
//! through each cluster's routing tree, extracts the deduplicated
//! inter-cluster nets, and cross-checks the result against the atom
//! netlist (unbound atoms, global-signal mixing, constant generators).
//!
//! # Pipeline
//!
//! 1. **Parse** — read the document tree ([`xml`])
//! 2. **Populate** — per-cluster pb trees and routing tables ([`ingest`],
//!    using [`resolve`] for pin expressions)
//! 3. **Propagate** — transitive net-identity fill over each routing table
//! 4. **Cross-check** — constant generators ([`constgen`]), inter-cluster
//!    nets and global signals ([`extract`])
//!
//! # Usage
//!
//! ```ignore
//! use fabric_pack::read_packed_netlist;
//!
//! let (clusters, lookup) = read_packed_netlist(&text, "design.net", &arch, &atoms)?;
//! ```

#![warn(missing_docs)]

pub mod clustered;
pub mod constgen;
pub mod error;
pub mod extract;
pub mod ids;
pub mod ingest;
pub mod lookup;
pub mod resolve;
pub mod xml;

pub use clustered::{ClusterPin, ClusteredBlock, ClusteredNetlist, ExtNet, Pb, PbRouteEntry};
pub use constgen::mark_constant_generators;
pub use error::PackError;
pub use extract::load_external_nets;
pub use ids::{ExtNetId, PbId};
pub use ingest::{read_packed_netlist, ROOT_INSTANCE};
pub use lookup::AtomLookup;
pub use resolve::{resolve_pin_expr, ResolveError, ResolvedPin};
pub use xml::{parse_document, XmlNode};
