//! Core dendritic snow-crystal growth simulation library.
//!
//! Main components:
//! - [`cell`] — per-cell state (vapor, crystal, boundary mass, attachment).
//! - [`params`] — immutable run parameters and validation.
//! - [`grid`] — toroidal 2-D cell grid and the hexagonal neighbor stencil.
//! - [`phases`] — the four pure update phases (diffusion, freezing,
//!   attachment, melting).
//! - [`driver`] — generation orchestration, buffer swapping, and the
//!   combined/separated pass modes.
//! - [`snapshot`] — flat-record grid persistence for tests and diagnostics.

pub mod cell;
pub mod driver;
pub mod grid;
pub mod params;
pub mod phases;
pub mod snapshot;
