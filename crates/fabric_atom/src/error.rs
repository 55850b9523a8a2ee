//! Error types for atom netlist construction and truth-table handling.

/// Errors raised by the atom netlist store and the truth-table utilities.
///
/// Structural invariant violations inside mutators are programming errors
/// and panic instead; these variants cover conditions a caller can cause
/// with otherwise well-formed input.
#[derive(Debug, thiserror::Error)]
pub enum AtomError {
    /// An entity was added under a name that is already live.
    #[error("{kind} name '{name}' is already in use")]
    DuplicateName {
        /// Entity kind ("block" or "net").
        kind: &'static str,
        /// The clashing name.
        name: String,
    },

    /// A truth table's rows disagree on the output value, so the cover
    /// cannot be classified as on-set or off-set.
    #[error("truth table rows disagree on output value (row {row})")]
    InconsistentTruthTable {
        /// Zero-based index of the first disagreeing row.
        row: usize,
    },

    /// A truth-table row carries an output value other than 0 or 1.
    #[error("truth table output value must be 0 or 1")]
    InvalidTruthTableOutput,
}
