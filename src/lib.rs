//! Grid-based incompressible-fluid solver in the stable-fluids family.
//!
//! A [`Grid`] of cells carrying density and velocity is advanced by
//! [`solver::fluid_step`]: one diffusion sweep, semi-Lagrangian advection and a
//! Jacobi pressure projection. Reads outside the grid return a fixed inflow
//! value and an optional rectangular [`Vent`] holds a frozen two-outlet jet.
//! Rendering lives in [`renderer`] and only consumes finished [`Snapshot`]s.

pub mod config;
pub mod grid;
pub mod renderer;
pub mod solver;
pub mod vec2;

pub use grid::{Cell, CellView, Grid, GridError, Snapshot};
pub use solver::{fluid_step, Inflow, Rect, Simulation, SolverParams, Vent};
pub use vec2::Vec2;
