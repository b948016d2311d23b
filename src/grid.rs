use std::fmt;

use crate::solver::boundary::{Inflow, Vent};
use crate::vec2::Vec2;

/// Errors raised by grid construction and direct cell edits.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    InvalidDimensions { width: usize, height: usize },
    InvalidVent(Vent),
    AlreadyInitialized,
    OutOfBounds { y: usize, x: usize },
    ObstacleCell { y: usize, x: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive and addressable, got {}x{}", width, height)
            }
            GridError::InvalidVent(vent) => write!(f, "vent rectangle is inverted: {:?}", vent.rect),
            GridError::AlreadyInitialized => write!(f, "grid has already been initialized"),
            GridError::OutOfBounds { y, x } => write!(f, "cell ({}, {}) is outside the grid", y, x),
            GridError::ObstacleCell { y, x } => write!(f, "cell ({}, {}) is part of the vent and cannot be edited", y, x),
        }
    }
}

impl std::error::Error for GridError {}

/// Read-only copy of a cell's current values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView {
    pub density: f64,
    pub velocity: Vec2,
    pub potential: f64,
}

/// Simulation unit. `next_*` fields hold values staged by the pass in progress
/// and only become visible to `Grid::at` after a publish.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub(crate) density: f64,
    pub(crate) velocity: Vec2,
    pub(crate) potential: f64,
    pub(crate) next_density: f64,
    pub(crate) next_velocity: Vec2,
    pub(crate) next_potential: f64,
}

impl Cell {
    pub fn view(&self) -> CellView {
        CellView {
            density: self.density,
            velocity: self.velocity,
            potential: self.potential,
        }
    }
}

/// Owned copy of the published density/velocity fields, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub density: Vec<f64>,
    pub velocity: Vec<Vec2>,
}

impl Snapshot {
    pub fn density_at(&self, y: usize, x: usize) -> f64 {
        self.density[y * self.width + x]
    }

    pub fn velocity_at(&self, y: usize, x: usize) -> Vec2 {
        self.velocity[y * self.width + x]
    }
}

/// Fixed-size cell array with a sentinel boundary and an optional vent obstacle.
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    sentinel: CellView,
    vent: Option<Vent>,
    initialized: bool,
}

impl Grid {
    /// Allocate a `width` x `height` grid whose out-of-range reads resolve to `inflow`.
    pub fn new(width: usize, height: usize, inflow: Inflow) -> Result<Self, GridError> {
        let addressable = |n: usize| {
            n.checked_mul(std::mem::size_of::<Cell>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        };
        let len = width
            .checked_mul(height)
            .filter(|&n| n > 0 && addressable(n))
            .ok_or(GridError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); len],
            sentinel: CellView {
                density: inflow.density,
                velocity: inflow.velocity,
                potential: 0.0,
            },
            vent: None,
            initialized: false,
        })
    }

    /// Write the ambient inflow state everywhere and the split jet inside `vent`.
    /// Vent cells are frozen from here on.
    pub fn init(&mut self, vent: Option<Vent>) -> Result<(), GridError> {
        if self.initialized {
            return Err(GridError::AlreadyInitialized);
        }
        if let Some(v) = vent {
            if v.rect.is_inverted() {
                return Err(GridError::InvalidVent(v));
            }
        }
        self.vent = vent;

        let mut obstacle_cells = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                let (density, velocity) = match self.vent {
                    Some(v) if v.contains(y as i64, x as i64) => {
                        obstacle_cells += 1;
                        (0.0, v.jet_velocity(y as i64))
                    }
                    _ => (self.sentinel.density, self.sentinel.velocity),
                };
                let i = self.index(y, x);
                self.cells[i] = Cell {
                    density,
                    velocity,
                    potential: 0.0,
                    next_density: density,
                    next_velocity: velocity,
                    next_potential: 0.0,
                };
            }
        }
        self.initialized = true;

        log::debug!(
            "grid initialized: {}x{}, {} active cells, {} vent cells",
            self.width,
            self.height,
            self.cells.len() - obstacle_cells,
            obstacle_cells
        );
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn vent(&self) -> Option<&Vent> {
        self.vent.as_ref()
    }

    /// Value returned for every out-of-range coordinate.
    pub fn sentinel(&self) -> CellView {
        self.sentinel
    }

    #[inline]
    fn index(&self, y: usize, x: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    fn in_bounds(&self, y: i64, x: i64) -> bool {
        0 <= y && y < self.height as i64 && 0 <= x && x < self.width as i64
    }

    /// Boundary-safe read of the current (published) values.
    #[inline]
    pub fn at(&self, y: i64, x: i64) -> CellView {
        if self.in_bounds(y, x) {
            self.cells[self.index(y as usize, x as usize)].view()
        } else {
            self.sentinel
        }
    }

    pub fn is_obstacle(&self, y: i64, x: i64) -> bool {
        self.in_bounds(y, x) && self.vent.is_some_and(|v| v.contains(y, x))
    }

    /// Visit every in-bounds, non-vent cell once, row-major.
    pub fn for_each_active_cell<F: FnMut(usize, usize, CellView)>(&self, mut f: F) {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_obstacle(y as i64, x as i64) {
                    continue;
                }
                f(y, x, self.cells[self.index(y, x)].view());
            }
        }
    }

    pub fn active_cell_count(&self) -> usize {
        let mut count = 0;
        self.for_each_active_cell(|_, _, _| count += 1);
        count
    }

    /// Overwrite one active cell's current density and velocity.
    pub fn set_cell(&mut self, y: usize, x: usize, density: f64, velocity: Vec2) -> Result<(), GridError> {
        if y >= self.height || x >= self.width {
            return Err(GridError::OutOfBounds { y, x });
        }
        if self.is_obstacle(y as i64, x as i64) {
            return Err(GridError::ObstacleCell { y, x });
        }
        let i = self.index(y, x);
        let cell = &mut self.cells[i];
        cell.density = density;
        cell.velocity = velocity;
        Ok(())
    }

    /// Run one pass: `compute` reads only published state through `&Grid`,
    /// `write` stores the result in the cell's staging buffers.
    pub(crate) fn stage_active<T, C, W>(&mut self, mut compute: C, mut write: W)
    where
        C: FnMut(&Grid, i64, i64) -> T,
        W: FnMut(&mut Cell, T),
    {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_obstacle(y as i64, x as i64) {
                    continue;
                }
                let value = compute(self, y as i64, x as i64);
                let i = self.index(y, x);
                write(&mut self.cells[i], value);
            }
        }
    }

    /// Publish staged density and velocity of active cells.
    pub(crate) fn publish_transport(&mut self) {
        self.publish_with(|cell| {
            cell.density = cell.next_density;
            cell.velocity = cell.next_velocity;
        });
    }

    /// Publish staged potential of active cells.
    pub(crate) fn publish_potential(&mut self) {
        self.publish_with(|cell| cell.potential = cell.next_potential);
    }

    fn publish_with<F: FnMut(&mut Cell)>(&mut self, mut f: F) {
        let vent = self.vent;
        let width = self.width;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            let (y, x) = ((i / width) as i64, (i % width) as i64);
            if vent.is_some_and(|v| v.contains(y, x)) {
                continue;
            }
            f(cell);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            density: self.cells.iter().map(|c| c.density).collect(),
            velocity: self.cells.iter().map(|c| c.velocity).collect(),
        }
    }
}
