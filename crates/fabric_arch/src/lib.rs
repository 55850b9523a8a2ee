//! FPGA device architecture model for the fabric netlist loader.
//!
//! This crate holds the device-side data the post-pack netlist loader
//! resolves against: interned primitive [`Model`]s, the hierarchical
//! [`PbType`] trees describing cluster internals, and the instantiated
//! per-cluster-type [`PbGraph`] whose pins carry the flat
//! `pin_count_in_cluster` numbering used by packed-netlist routing tables.
//!
//! Architecture-XML parsing is an external collaborator; this crate only
//! defines the model it produces, plus builders that tests and readers use
//! to assemble one.
//!
//! # Architecture
//!
//! - **[`Arena`]** provides dense, ID-indexed storage for pin-graph nodes
//!   and pins.
//! - **Opaque IDs** ([`PbGraphNodeId`], [`PbGraphPinId`]) are `Copy` +
//!   `Hash` for cheap cross-references.
//! - **Shared handles**: [`Model`] and [`PbType`] are immutable and shared
//!   via `Arc`, with no back-references into netlist data.

#![warn(missing_docs)]

pub mod arena;
pub mod cluster;
pub mod ids;
pub mod model;
pub mod pb_graph;
pub mod pb_type;

pub use arena::{Arena, ArenaId};
pub use cluster::{Architecture, ClusterType, PinClass};
pub use ids::{PbGraphNodeId, PbGraphPinId};
pub use model::{Model, ModelLibrary, ModelPort, MODEL_INPUT, MODEL_LATCH, MODEL_NAMES, MODEL_OUTPUT};
pub use pb_graph::{PbGraph, PbGraphEdge, PbGraphNode, PbGraphPin};
pub use pb_type::{Mode, PbChild, PbPort, PbType, PortKind};
