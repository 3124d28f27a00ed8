//! Grid snapshots for tests and diagnostics.
//!
//! A snapshot captures the dimensions, the parameter set, and every cell
//! of a committed grid. Cells encode to a flat row-major sequence of
//! 4-float records `[vapor, crystal, boundary, attached]`, with the
//! attached flag stored as `0.0` / `1.0`, matching the channel layout the
//! original GPU formulation kept in its texture.

use crate::{cell::Cell, driver::Simulation, grid::Grid, params::Params};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Floats per encoded cell record.
pub const RECORD_LEN: usize = 4;

/// A point-in-time copy of one run's grid and configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub params: Params,
    pub cells: Vec<Cell>,
}

/// Failure while decoding a flat record sequence.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("expected {expected} floats for a {width}x{height} grid, got {actual}")]
    LengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

impl Snapshot {
    /// Captures the committed grid of a running simulation.
    pub fn capture(sim: &Simulation) -> Self {
        Self::from_grid(sim.grid(), *sim.params())
    }

    pub fn from_grid(grid: &Grid, params: Params) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            params,
            cells: grid.cells().to_vec(),
        }
    }

    /// Encodes the cells as flat row-major 4-float records.
    pub fn to_records(&self) -> Vec<f32> {
        let mut records = Vec::with_capacity(self.cells.len() * RECORD_LEN);
        for cell in &self.cells {
            records.push(cell.vapor);
            records.push(cell.crystal);
            records.push(cell.boundary);
            records.push(if cell.attached { 1.0 } else { 0.0 });
        }
        records
    }

    /// Decodes a flat record sequence produced by [`Snapshot::to_records`].
    ///
    /// ### Errors
    /// [`SnapshotError::LengthMismatch`] if the sequence does not hold
    /// exactly `width * height` records.
    pub fn from_records(
        width: usize,
        height: usize,
        params: Params,
        records: &[f32],
    ) -> Result<Self, SnapshotError> {
        let expected = width * height * RECORD_LEN;
        if records.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                width,
                height,
                expected,
                actual: records.len(),
            });
        }

        let cells = records
            .chunks_exact(RECORD_LEN)
            .map(|r| Cell {
                vapor: r[0],
                crystal: r[1],
                boundary: r[2],
                attached: r[3] != 0.0,
            })
            .collect();

        Ok(Self {
            width,
            height,
            params,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Mode;

    #[test]
    fn records_round_trip_after_a_few_generations() {
        let mut sim = Simulation::new(7, 7, Params::default(), Mode::Separated)
            .expect("valid configuration");
        for _ in 0..3 {
            sim.step();
        }

        let snapshot = Snapshot::capture(&sim);
        let records = snapshot.to_records();
        assert_eq!(records.len(), 7 * 7 * RECORD_LEN);

        let decoded =
            Snapshot::from_records(7, 7, Params::default(), &records).expect("matching length");
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn truncated_records_are_rejected() {
        let result = Snapshot::from_records(3, 3, Params::default(), &[0.0; 8]);
        assert_eq!(
            result.err(),
            Some(SnapshotError::LengthMismatch {
                width: 3,
                height: 3,
                expected: 36,
                actual: 8,
            })
        );
    }

    #[test]
    fn attached_flag_encodes_as_unit_alpha() {
        let grid = Grid::seeded(3, 3, 0.5);
        let snapshot = Snapshot::from_grid(&grid, Params::default());
        let records = snapshot.to_records();

        // Center cell is record 4 of the row-major sequence.
        let seed = &records[4 * RECORD_LEN..5 * RECORD_LEN];
        assert_eq!(seed, [0.0, 1.0, 0.0, 1.0]);
    }
}
