use serde::{Deserialize, Serialize};

/// State of a single grid cell.
///
/// The three mass fields are always non-negative. `attached` is
/// irreversible: once a cell joins the crystal lattice it never leaves it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Diffusing water-vapor mass.
    pub vapor: f32,
    /// Solid ice mass.
    pub crystal: f32,
    /// Transient liquid-like mass at the ice/vapor interface.
    pub boundary: f32,
    /// Whether the cell has permanently joined the crystal lattice.
    pub attached: bool,
}

impl Cell {
    /// An unattached cell holding only the given vapor mass.
    pub fn with_vapor(vapor: f32) -> Self {
        Self {
            vapor,
            crystal: 0.0,
            boundary: 0.0,
            attached: false,
        }
    }

    /// The crystal seed: attached, one unit of crystal mass, no vapor.
    pub fn seed() -> Self {
        Self {
            vapor: 0.0,
            crystal: 1.0,
            boundary: 0.0,
            attached: true,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::with_vapor(0.0)
    }
}
