mod advection;
pub mod boundary;
pub mod diagnostics;
mod diffusion;
mod params;
mod projection;

// Re-export public API
pub use advection::{advect, sample};
pub use boundary::{Inflow, Rect, Vent};
pub use diffusion::diffuse;
pub use params::SolverParams;
pub use projection::{apply_velocity_correction, clear_divergence, divergence, potential_gradient, relax_potential};

use crate::grid::{CellView, Grid, GridError, Snapshot};

/// Advance the grid by one timestep:
/// diffuse -> publish -> advect -> publish -> (Jacobi sweep -> publish) x N -> correction.
///
/// The grid must have been through [`Grid::init`]; [`Simulation`] guarantees this.
/// Vent cells are skipped by every stage. Non-finite input is not detected and
/// propagates through the field; callers must seed finite values.
pub fn fluid_step(grid: &mut Grid, params: &SolverParams) {
    debug_assert!(grid.is_initialized(), "fluid_step called before Grid::init");

    // Diffuse density and velocity
    diffuse(grid, params.dt, params.k_density, params.k_velocity);
    grid.publish_transport();

    // Advect along the diffused velocity
    advect(grid, params.dt);
    grid.publish_transport();

    // Relax the potential, then subtract its gradient
    relax_potential(grid, params.divergence_iters);
    apply_velocity_correction(grid);
}

/// Owns an initialized grid and the solver constants that drive it.
pub struct Simulation {
    grid: Grid,
    params: SolverParams,
    steps: u64,
    paused: bool,
}

impl Simulation {
    /// Build and initialize a grid in one go, so a `Simulation` is always steppable.
    pub fn new(
        width: usize,
        height: usize,
        inflow: Inflow,
        vent: Option<Vent>,
        params: SolverParams,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(width, height, inflow)?;
        grid.init(vent)?;
        Ok(Self {
            grid,
            params,
            steps: 0,
            paused: false,
        })
    }

    /// 100x100 grid with the default inflow, vent and solver constants.
    pub fn with_defaults() -> Result<Self, GridError> {
        Self::new(100, 100, Inflow::default(), Some(Vent::default()), SolverParams::default())
    }

    pub fn step(&mut self) {
        fluid_step(&mut self.grid, &self.params);
        self.steps += 1;
    }

    /// Step only while running; returns whether a step was taken.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.step();
        true
    }

    pub fn begin(&mut self) {
        if self.paused {
            log::debug!("simulation resumed at step {}", self.steps);
        }
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if !self.paused {
            log::debug!("simulation paused at step {}", self.steps);
        }
        self.paused = true;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.begin();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn at(&self, y: i64, x: i64) -> CellView {
        self.grid.at(y, x)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2::Vec2;

    #[test]
    fn test_uniform_flow_stable_under_full_step() {
        let mut sim = Simulation::new(5, 5, Inflow::default(), None, SolverParams::default()).unwrap();
        sim.step();
        for y in 0..5 {
            for x in 0..5 {
                let c = sim.at(y, x);
                assert!((c.density - 30.0).abs() < 1e-9, "density at ({}, {}): {}", y, x, c.density);
                assert!((c.velocity.x - 15.0).abs() < 1e-9, "vx at ({}, {}): {}", y, x, c.velocity.x);
                assert!(c.velocity.y.abs() < 1e-9, "vy at ({}, {}): {}", y, x, c.velocity.y);
            }
        }
    }

    #[test]
    fn test_vent_jet_reaches_neighbours() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.step();

        let above = sim.at(39, 15);
        let below = sim.at(61, 15);
        assert!(above.velocity.y.abs() > 1e-3, "cell above the vent should feel the jet: {:?}", above);
        assert!(below.velocity.y.abs() > 1e-3, "cell below the vent should feel the jet: {:?}", below);
        assert!(
            above.velocity.y * below.velocity.y < 0.0,
            "the two outlets push in opposite directions: {:?} vs {:?}",
            above.velocity,
            below.velocity
        );

        for y in 40..=60 {
            for x in 10..=20 {
                assert_eq!(sim.at(y, x).density, 0.0, "vent density must stay zero at ({}, {})", y, x);
            }
        }
    }

    #[test]
    fn test_far_field_unaffected_after_one_step() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.step();
        let far = sim.at(90, 90);
        assert!((far.density - 30.0).abs() < 1e-9);
        assert!((far.velocity.x - 15.0).abs() < 1e-9);
        assert!(far.velocity.y.abs() < 1e-9);
    }

    #[test]
    fn test_vent_cells_immutable_over_many_steps() {
        let mut sim = Simulation::with_defaults().unwrap();
        let before = sim.snapshot();
        for _ in 0..5 {
            sim.step();
        }
        let after = sim.snapshot();
        let vent = Vent::default();
        for y in 0..100 {
            for x in 0..100 {
                if vent.contains(y as i64, x as i64) {
                    assert_eq!(after.density_at(y, x), before.density_at(y, x));
                    assert_eq!(after.velocity_at(y, x), before.velocity_at(y, x));
                }
            }
        }
        assert_eq!(sim.steps(), 5);
    }

    #[test]
    fn test_sentinel_unchanged_by_steps() {
        let mut sim = Simulation::with_defaults().unwrap();
        for _ in 0..3 {
            sim.step();
        }
        for &(y, x) in &[(-1, 50), (100, 50), (50, -1), (50, 100)] {
            let c = sim.at(y, x);
            assert_eq!(c.density, 30.0);
            assert_eq!(c.velocity, Vec2::new(15.0, 0.0));
        }
    }

    #[test]
    fn test_identical_runs_are_bitwise_equal() {
        let mut a = Simulation::with_defaults().unwrap();
        let mut b = Simulation::with_defaults().unwrap();
        for _ in 0..4 {
            a.step();
            b.step();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_repeated_steps_match_manual_pipeline() {
        let mut sim = Simulation::with_defaults().unwrap();
        let mut grid = Grid::new(100, 100, Inflow::default()).unwrap();
        grid.init(Some(Vent::default())).unwrap();
        let params = SolverParams::default();
        for _ in 0..3 {
            sim.step();
            fluid_step(&mut grid, &params);
        }
        assert_eq!(sim.snapshot(), grid.snapshot());
    }

    /// Small ambient grid with two disturbed cells so no stage is a no-op.
    fn disturbed_grid() -> Grid {
        let mut grid = Grid::new(6, 6, Inflow::default()).unwrap();
        grid.init(None).unwrap();
        grid.set_cell(2, 2, 5.0, Vec2::new(3.0, -2.0)).unwrap();
        grid.set_cell(3, 4, 12.0, Vec2::new(-4.0, 6.0)).unwrap();
        grid
    }

    #[test]
    fn test_step_runs_stages_in_order() {
        let params = SolverParams::default();

        let mut stepped = disturbed_grid();
        fluid_step(&mut stepped, &params);

        let mut ordered = disturbed_grid();
        diffuse(&mut ordered, params.dt, params.k_density, params.k_velocity);
        ordered.publish_transport();
        advect(&mut ordered, params.dt);
        ordered.publish_transport();
        relax_potential(&mut ordered, params.divergence_iters);
        apply_velocity_correction(&mut ordered);
        assert_eq!(stepped.snapshot(), ordered.snapshot());

        let mut swapped = disturbed_grid();
        advect(&mut swapped, params.dt);
        swapped.publish_transport();
        diffuse(&mut swapped, params.dt, params.k_density, params.k_velocity);
        swapped.publish_transport();
        relax_potential(&mut swapped, params.divergence_iters);
        apply_velocity_correction(&mut swapped);
        assert_ne!(
            stepped.snapshot(),
            swapped.snapshot(),
            "advecting before diffusing must give a different field"
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "before Grid::init")]
    fn test_step_requires_init() {
        let mut grid = Grid::new(4, 4, Inflow::default()).unwrap();
        fluid_step(&mut grid, &SolverParams::default());
    }

    #[test]
    fn test_pause_blocks_tick() {
        let mut sim = Simulation::new(5, 5, Inflow::default(), None, SolverParams::default()).unwrap();
        assert!(sim.tick());
        sim.pause();
        assert!(sim.is_paused());
        assert!(!sim.tick());
        assert_eq!(sim.steps(), 1);
        sim.toggle_pause();
        assert!(sim.tick());
        assert_eq!(sim.steps(), 2);
    }

    #[test]
    fn test_invalid_dimensions_fail_fast() {
        let err = Simulation::new(0, 5, Inflow::default(), None, SolverParams::default()).err();
        assert_eq!(err, Some(GridError::InvalidDimensions { width: 0, height: 5 }));
    }

    #[test]
    fn test_many_steps_stay_finite() {
        let mut sim = Simulation::with_defaults().unwrap();
        for _ in 0..20 {
            sim.step();
        }
        let snap = sim.snapshot();
        assert!(snap.density.iter().all(|d| d.is_finite()));
        assert!(snap.velocity.iter().all(|v| v.x.is_finite() && v.y.is_finite()));
    }
}
