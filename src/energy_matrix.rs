use crate::energy_table::ParsedTable;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Residue × mutant energy grid backing one heatmap.
///
/// Axis labels keep first-seen order across the input tables, so a fixed
/// input order gives a reproducible layout. A `None` cell means "no record
/// maps here" and is rendered differently from a real 0.0 energy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyMatrix {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<char>,
    pub grid: Vec<Vec<Option<f64>>>,
}

impl EnergyMatrix {
    /// Build a matrix from one or more parsed tables.
    ///
    /// When several entries target the same (residue, mutant) cell, the last
    /// write wins. That is deliberate overwrite semantics, not an error:
    /// combined views layer per-mutation tables in cache order.
    pub fn build(tables: &[&ParsedTable]) -> Self {
        let row_labels: Vec<String> = tables
            .iter()
            .flat_map(|t| t.entries.iter())
            .map(|e| e.residue.clone())
            .unique()
            .collect();
        let column_labels: Vec<char> = tables
            .iter()
            .flat_map(|t| t.entries.iter())
            .map(|e| e.mutant)
            .unique()
            .collect();

        let mut grid = vec![vec![None; column_labels.len()]; row_labels.len()];
        for table in tables {
            for entry in &table.entries {
                let row = row_labels
                    .iter()
                    .position(|r| *r == entry.residue)
                    .expect("Residue label missing from its own axis");
                let col = column_labels
                    .iter()
                    .position(|c| *c == entry.mutant)
                    .expect("Mutant label missing from its own axis");
                grid[row][col] = Some(entry.energy);
            }
        }

        Self {
            row_labels,
            column_labels,
            grid,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.column_labels.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.grid.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Smallest and largest energy present, if any cell is filled.
    pub fn energy_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for row in &self.grid {
            for value in row.iter().flatten() {
                range = Some(match range {
                    None => (*value, *value),
                    Some((lo, hi)) => (lo.min(*value), hi.max(*value)),
                });
            }
        }
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy_table::parse;

    #[test]
    fn axis_order_is_first_seen_not_numeric() {
        let table = parse("r9_A 1.0\nr2_C 2.0\nr9_C 3.0", "t");
        let m = EnergyMatrix::build(&[&table]);
        assert_eq!(m.row_labels, vec!["9", "2"]);
        assert_eq!(m.column_labels, vec!['A', 'C']);
        assert_eq!(m.grid.len(), 2);
        assert_eq!(m.grid[0].len(), 2);
    }

    #[test]
    fn missing_cells_are_none_not_zero() {
        let table = parse("r1_A 0.0\nr2_C -1.0", "t");
        let m = EnergyMatrix::build(&[&table]);
        assert_eq!(m.cell(0, 0), Some(0.0));
        assert_eq!(m.cell(0, 1), None);
        assert_eq!(m.cell(1, 0), None);
        assert_eq!(m.cell(1, 1), Some(-1.0));
    }

    #[test]
    fn last_write_wins_across_tables() {
        let a = parse("r5_A 1.0", "a");
        let b = parse("r5_A 2.0", "b");
        let m = EnergyMatrix::build(&[&a, &b]);
        assert_eq!(m.cell(0, 0), Some(2.0));
    }

    #[test]
    fn empty_input_builds_empty_matrix() {
        let table = parse("# nothing here", "t");
        let m = EnergyMatrix::build(&[&table]);
        assert!(m.is_empty());
        assert!(m.energy_range().is_none());
    }

    #[test]
    fn energy_range_spans_all_cells() {
        let table = parse("r1_A -3.0\nr1_C 2.5\nr2_A 0.5", "t");
        let m = EnergyMatrix::build(&[&table]);
        assert_eq!(m.energy_range(), Some((-3.0, 2.5)));
    }
}
