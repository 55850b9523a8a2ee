//! Atom netlist core for the fabric toolchain.
//!
//! This crate owns the primitive-level netlist that flows through the
//! post-pack pipeline: an ID-keyed relational store of blocks, ports, pins,
//! and nets with tombstoning removal, the truth-table utilities shared by
//! the passes and the emitter, the structural transformation passes
//! (buffer-LUT absorption and the dangling-entity sweeps), and the
//! gate-level (BLIF) emitter.
//!
//! # Architecture
//!
//! - **[`AtomNetlist`]** stores entities in parallel ID-indexed slot
//!   vectors; cross-references are IDs, kept consistent on both sides by
//!   every mutator, and removal tombstones the slot so IDs are never
//!   reused.
//! - **Opaque IDs** ([`AtomBlockId`], [`AtomPortId`], [`AtomPinId`],
//!   [`AtomNetId`]) are `Copy` + `Hash` for cheap cross-references.
//! - **Models** are shared immutable [`Arc`](std::sync::Arc) handles
//!   interned by `fabric_arch`'s model library.

#![warn(missing_docs)]

pub mod blif;
pub mod dump;
pub mod error;
pub mod ids;
pub mod logic;
pub mod netlist;
pub mod transform;
pub mod truth_table;

pub use blif::{write_blif, OUTPAD_NAME_PREFIX};
pub use dump::write_netlist_dump;
pub use error::AtomError;
pub use ids::{AtomBlockId, AtomNetId, AtomPinId, AtomPortId};
pub use logic::Logic;
pub use netlist::{AtomNetlist, BlockType, PinType};
pub use transform::{
    absorb_buffer_luts, is_buffer_lut, is_removable_block, is_removable_input,
    is_removable_output, sweep_blocks, sweep_constant_primary_outputs, sweep_inputs,
    sweep_iterative, sweep_nets, sweep_outputs, SweepOptions,
};
pub use truth_table::{
    cube_to_minterms, expand_truth_table, truth_table_encodes_on_set, truth_table_to_lut_mask,
    TruthTable,
};
