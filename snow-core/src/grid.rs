use crate::cell::Cell;
use glam::{IVec2, ivec2};

/// The six neighbor offsets of the hexagonal-packing stencil, realized on
/// the square grid, in the fixed enumeration order:
/// up-left, up-right, right, down-right, down-left, left.
///
/// The order must not change: phase results are only reproducible while
/// neighbors are visited in exactly this sequence.
pub const NEIGHBOR_OFFSETS: [IVec2; 6] = [
    ivec2(-1, 1),
    ivec2(0, 1),
    ivec2(1, 0),
    ivec2(1, -1),
    ivec2(0, -1),
    ivec2(-1, 0),
];

/// A 2-D array of [`Cell`]s with toroidal (wrap-around) addressing.
///
/// Cells are stored row-major in a flat `Vec`. Out-of-range coordinates
/// wrap modulo the grid size on both axes, so `get` always succeeds and a
/// cell on an edge sees neighbors from the opposite edge.
///
/// The driver keeps two grids of identical shape and alternates between
/// them; a `Grid` itself is just the storage plus coordinate math.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with every cell holding `rho` vapor and nothing else.
    pub fn uniform(width: usize, height: usize, rho: f32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::with_vapor(rho); width * height],
        }
    }

    /// Creates a grid of ambient vapor `rho` with a single attached seed
    /// cell of crystal mass 1 at the geometric center.
    pub fn seeded(width: usize, height: usize, rho: f32) -> Self {
        let mut grid = Self::uniform(width, height, rho);
        let (cx, cy) = (width as i32 / 2, height as i32 / 2);
        *grid.get_mut(cx, cy) = Cell::seed();
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat row-major view of the cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable flat row-major view, used by the driver when materializing
    /// a pass into this grid.
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Maps possibly-negative coordinates onto the torus.
    ///
    /// Uses `rem_euclid` so the result is always non-negative; a plain `%`
    /// would misplace neighbors of column/row 0.
    fn wrap(&self, x: i32, y: i32) -> usize {
        let x = x.rem_euclid(self.width as i32) as usize;
        let y = y.rem_euclid(self.height as i32) as usize;
        y * self.width + x
    }

    /// Returns the cell at wrapped coordinates. Never fails.
    pub fn get(&self, x: i32, y: i32) -> &Cell {
        &self.cells[self.wrap(x, y)]
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        let idx = self.wrap(x, y);
        &mut self.cells[idx]
    }

    /// Copies of the six neighbors of `(x, y)` in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, x: i32, y: i32) -> [Cell; 6] {
        NEIGHBOR_OFFSETS.map(|off| *self.get(x + off.x, y + off.y))
    }

    /// Total vapor mass over the whole grid (diagnostics / conservation
    /// checks).
    pub fn total_vapor(&self) -> f64 {
        self.cells.iter().map(|c| c.vapor as f64).sum()
    }

    /// Number of attached cells.
    pub fn attached_count(&self) -> usize {
        self.cells.iter().filter(|c| c.attached).count()
    }
}

/// Number of attached cells among the six neighbors.
///
/// The original GPU formulation derived this by subtraction on floats and
/// clamped the result at zero; counting attached flags directly makes the
/// clamp implicit in the unsigned type.
pub fn neighbor_count(neighbors: &[Cell; 6]) -> u32 {
    neighbors.iter().filter(|n| n.attached).count() as u32
}

/// Whether a cell is a boundary site: at least one attached neighbor.
///
/// Only boundary sites exchange mass in the freezing and melting phases.
pub fn in_boundary(neighbors: &[Cell; 6]) -> bool {
    neighbor_count(neighbors) > 0
}
