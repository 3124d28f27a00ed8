//! The four per-cell update phases of the crystal-growth model.
//!
//! One generation applies, in order:
//! 1. [`diffusion`] — vapor relaxes toward the 7-cell local average.
//! 2. [`freezing`] — boundary sites convert their vapor into crystal and
//!    boundary mass.
//! 3. [`attachment`] — cells meeting the attachment conditions join the
//!    crystal lattice permanently.
//! 4. [`melting`] — boundary sites bleed a little boundary and crystal
//!    mass back into vapor.
//!
//! Each phase is a pure map `(cell, neighbors) -> cell`: it never touches
//! the neighbors it reads. How neighbor state is snapshotted between the
//! phases is the driver's concern (see [`crate::driver::Mode`]); the same
//! four functions serve both orchestration modes.

use crate::{
    cell::Cell,
    grid::{in_boundary, neighbor_count},
    params::Params,
};

/// Relaxes a cell's vapor toward the average of its 7-cell neighborhood.
///
/// The new vapor mass is
///
/// ```text
/// (Σ neighbor vapor + own vapor) / 7 · (1 − attached)
///   + neighborCount · own vapor / 7
/// ```
///
/// An unattached cell moves toward the local mean; an attached cell keeps
/// the formula total-mass consistent (its own vapor is normally zero, so
/// the second term contributes nothing). Only `vapor` changes; all other
/// fields pass through.
///
/// ### Parameters
/// - `cell` - The cell being updated.
/// - `neighbors` - The six neighbors in stencil order.
///
/// ### Returns
/// The cell with its post-diffusion vapor mass.
pub fn diffusion(cell: &Cell, neighbors: &[Cell; 6]) -> Cell {
    let nearby: f32 = neighbors.iter().map(|n| n.vapor).sum();
    let count = neighbor_count(neighbors) as f32;
    let attached = if cell.attached { 1.0 } else { 0.0 };

    let vapor =
        (nearby + cell.vapor) / 7.0 * (1.0 - attached) + count * cell.vapor / 7.0;

    Cell { vapor, ..*cell }
}

/// Converts a boundary site's vapor into crystal and boundary mass.
///
/// At a boundary site (at least one attached neighbor), a `kappa` fraction
/// of the cell's vapor freezes directly into crystal and the remaining
/// `(1 − kappa)` fraction condenses into boundary mass; the vapor is fully
/// drained. Interior and far-field cells are unaffected.
///
/// ### Parameters
/// - `cell` - The cell being updated, read with its own current vapor
///   (post-diffusion when the phases run in sequence).
/// - `neighbors` - The six neighbors; only their `attached` flags matter.
/// - `params` - Supplies `kappa`.
pub fn freezing(cell: &Cell, neighbors: &[Cell; 6], params: &Params) -> Cell {
    if !in_boundary(neighbors) {
        return *cell;
    }

    Cell {
        vapor: 0.0,
        crystal: cell.crystal + params.kappa * cell.vapor,
        boundary: cell.boundary + (1.0 - params.kappa) * cell.vapor,
        ..*cell
    }
}

/// Decides whether a cell permanently joins the crystal lattice.
///
/// Four independent conditions are OR-ed together, all evaluated on the
/// pre-phase cell and neighbor state (`nearbyVapor` is the sum of the six
/// neighbors' vapor, not including the cell's own):
///
/// - 1 or 2 attached neighbors and `boundary > beta`;
/// - exactly 3 attached neighbors and `boundary ≥ 1`;
/// - exactly 3 attached neighbors, `boundary ≥ alpha`, and
///   `nearbyVapor < theta`;
/// - 4 or more attached neighbors, unconditionally.
///
/// When a cell attaches, its entire boundary mass crystallizes in the same
/// phase. Attachment only ever turns on; an already-attached cell passes
/// through unchanged.
///
/// ### Parameters
/// - `cell` - The cell being updated.
/// - `neighbors` - The six neighbors in stencil order.
/// - `params` - Supplies `beta`, `alpha`, and `theta`.
pub fn attachment(cell: &Cell, neighbors: &[Cell; 6], params: &Params) -> Cell {
    if cell.attached {
        return *cell;
    }

    let count = neighbor_count(neighbors);
    let nearby_vapor: f32 = neighbors.iter().map(|n| n.vapor).sum();

    let attaches = match count {
        1 | 2 => cell.boundary > params.beta,
        3 => {
            cell.boundary >= 1.0
                || (cell.boundary >= params.alpha && nearby_vapor < params.theta)
        }
        4.. => true,
        0 => false,
    };

    if !attaches {
        return *cell;
    }

    // Every attaching cell has at least one attached neighbor, so it is a
    // boundary site and its boundary mass crystallizes with it.
    Cell {
        crystal: cell.crystal + cell.boundary,
        boundary: 0.0,
        attached: true,
        ..*cell
    }
}

/// Returns a little boundary and crystal mass to vapor at boundary sites.
///
/// A `mu` fraction of boundary mass and a `gamma` fraction of crystal mass
/// convert back to vapor; the source fields shrink by the transferred
/// amounts. This is the only phase that can reduce crystal mass, and it
/// never clears the `attached` flag. Cells that are not boundary sites are
/// unaffected.
///
/// ### Parameters
/// - `cell` - The cell being updated.
/// - `neighbors` - The six neighbors; only their `attached` flags matter.
/// - `params` - Supplies `mu` and `gamma`.
pub fn melting(cell: &Cell, neighbors: &[Cell; 6], params: &Params) -> Cell {
    if !in_boundary(neighbors) {
        return *cell;
    }

    let from_boundary = params.mu * cell.boundary;
    let from_crystal = params.gamma * cell.crystal;

    Cell {
        vapor: cell.vapor + from_boundary + from_crystal,
        boundary: cell.boundary - from_boundary,
        crystal: cell.crystal - from_crystal,
        ..*cell
    }
}
