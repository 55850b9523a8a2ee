//! Single-output cover truth tables and their expansions.
//!
//! A truth table is stored in its source encoding: each row holds one input
//! value per LUT input plus a final output value. The output values decide
//! whether the rows list the function's on-set or off-set. An empty table
//! encodes constant zero and counts as an on-set encoding.

use crate::error::AtomError;
use crate::logic::Logic;

/// A single-output cover: rows of input values plus one output value.
pub type TruthTable = Vec<Vec<Logic>>;

/// Determines whether the table's rows encode the on-set (`true`) or the
/// off-set (`false`) of the function.
///
/// An empty table encodes constant zero and is treated as an on-set
/// encoding. Rows whose output values disagree are rejected, as is an
/// output value other than 0 or 1.
pub fn truth_table_encodes_on_set(truth_table: &TruthTable) -> Result<bool, AtomError> {
    let Some(first) = truth_table.first() else {
        return Ok(true);
    };
    assert!(!first.is_empty(), "truth-table rows cannot be empty");

    let on_set = match first[first.len() - 1] {
        Logic::True => true,
        Logic::False => false,
        Logic::DontCare | Logic::Unknown => return Err(AtomError::InvalidTruthTableOutput),
    };
    for (row_idx, row) in truth_table.iter().enumerate().skip(1) {
        assert!(!row.is_empty(), "truth-table rows cannot be empty");
        let out = row[row.len() - 1];
        match out {
            Logic::True | Logic::False => {
                if (out == Logic::True) != on_set {
                    return Err(AtomError::InconsistentTruthTable { row: row_idx });
                }
            }
            Logic::DontCare | Logic::Unknown => return Err(AtomError::InvalidTruthTableOutput),
        }
    }
    Ok(on_set)
}

/// Widens every row to `num_inputs + 1` values.
///
/// Existing input values are kept, missing input positions are filled with
/// `False`, and the output value stays in the last position.
pub fn expand_truth_table(truth_table: &TruthTable, num_inputs: usize) -> TruthTable {
    truth_table
        .iter()
        .map(|row| {
            let mut expanded = vec![Logic::False; num_inputs + 1];
            for (i, &value) in row.iter().take(row.len() - 1).enumerate() {
                expanded[i] = value;
            }
            expanded[num_inputs] = row[row.len() - 1];
            expanded
        })
        .collect()
}

/// Expands the cover into a full LUT mask of length `2^num_inputs`.
///
/// For an on-set encoding the background value is `False` and every minterm
/// covered by a row is set `True`; for an off-set encoding the roles are
/// reversed. Don't-care input positions are expanded recursively.
pub fn truth_table_to_lut_mask(
    truth_table: &TruthTable,
    num_inputs: usize,
) -> Result<Vec<Logic>, AtomError> {
    let on_set = truth_table_encodes_on_set(truth_table)?;

    let background = if on_set { Logic::False } else { Logic::True };
    let covered = if on_set { Logic::True } else { Logic::False };
    let mut mask = vec![background; 1 << num_inputs];

    for row in truth_table {
        let cube: Vec<Logic> = row[..row.len() - 1].to_vec();
        assert_eq!(cube.len(), num_inputs, "cube width must match input count");
        for minterm in cube_to_minterms(cube) {
            mask[minterm] = covered;
        }
    }
    Ok(mask)
}

/// Expands a cube (one row of input values) into the minterm numbers it
/// covers.
pub fn cube_to_minterms(cube: Vec<Logic>) -> Vec<usize> {
    let mut minterms = Vec::new();
    cube_to_minterms_recur(cube, &mut minterms);
    minterms
}

fn cube_to_minterms_recur(cube: Vec<Logic>, minterms: &mut Vec<usize>) {
    for i in 0..cube.len() {
        if cube[i] == Logic::DontCare {
            let mut cube_true = cube.clone();
            cube_true[i] = Logic::True;
            cube_to_minterms_recur(cube_true, minterms);

            let mut cube_false = cube;
            cube_false[i] = Logic::False;
            cube_to_minterms_recur(cube_false, minterms);
            return;
        }
        assert!(
            cube[i] == Logic::True || cube[i] == Logic::False,
            "cube values must be 0, 1, or don't-care"
        );
    }

    // No don't-cares left: the cube is a single minterm. The minterm number
    // is the binary value of the cube, bit i weighted 2^i.
    let mut minterm = 0usize;
    for (i, &value) in cube.iter().enumerate() {
        if value == Logic::True {
            minterm += 1 << i;
        }
    }
    minterms.push(minterm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Logic::{DontCare, False, True};

    #[test]
    fn empty_table_is_on_set() {
        assert!(truth_table_encodes_on_set(&vec![]).unwrap());
    }

    #[test]
    fn on_and_off_set_detection() {
        let on: TruthTable = vec![vec![True, True]];
        assert!(truth_table_encodes_on_set(&on).unwrap());
        let off: TruthTable = vec![vec![False, False]];
        assert!(!truth_table_encodes_on_set(&off).unwrap());
    }

    #[test]
    fn inconsistent_outputs_rejected() {
        let table: TruthTable = vec![vec![True, True], vec![False, False]];
        let err = truth_table_encodes_on_set(&table).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AtomError::InconsistentTruthTable { row: 1 }
        ));
    }

    #[test]
    fn dont_care_output_rejected() {
        let table: TruthTable = vec![vec![True, DontCare]];
        assert!(truth_table_encodes_on_set(&table).is_err());
    }

    #[test]
    fn expand_pads_missing_inputs() {
        let table: TruthTable = vec![vec![True, True]];
        let expanded = expand_truth_table(&table, 3);
        assert_eq!(expanded, vec![vec![True, False, False, True]]);
    }

    #[test]
    fn cube_without_dont_cares_is_one_minterm() {
        // in0=1, in1=0, in2=1 -> minterm 5.
        assert_eq!(cube_to_minterms(vec![True, False, True]), vec![5]);
    }

    #[test]
    fn cube_dont_care_expands() {
        let mut minterms = cube_to_minterms(vec![DontCare, True]);
        minterms.sort_unstable();
        assert_eq!(minterms, vec![2, 3]);
    }

    #[test]
    fn and2_mask() {
        // .names a b out / 11 1
        let table: TruthTable = vec![vec![True, True, True]];
        let mask = truth_table_to_lut_mask(&table, 2).unwrap();
        assert_eq!(mask, vec![False, False, False, True]);
    }

    #[test]
    fn off_set_mask_inverts_background() {
        // .names a out / 0 0  (identity encoded through its off-set)
        let table: TruthTable = vec![vec![False, False]];
        let mask = truth_table_to_lut_mask(&table, 1).unwrap();
        assert_eq!(mask, vec![False, True]);
    }

    #[test]
    fn empty_table_mask_is_constant_zero() {
        let mask = truth_table_to_lut_mask(&vec![], 2).unwrap();
        assert_eq!(mask, vec![False; 4]);
    }

    #[test]
    fn dont_care_row_covers_both_minterms() {
        // .names a b out / -1 1
        let table: TruthTable = vec![vec![DontCare, True, True]];
        let mask = truth_table_to_lut_mask(&table, 2).unwrap();
        assert_eq!(mask, vec![False, False, True, True]);
    }
}
