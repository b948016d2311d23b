use crate::grid::Grid;
use crate::vec2::Vec2;

/// Central-difference velocity divergence at `(y, x)`:
/// `(vx(E) - vx(W) + vy(S) - vy(N)) / 2`.
/// Sentinel and vent neighbours contribute their fixed values.
pub fn divergence(grid: &Grid, y: i64, x: i64) -> f64 {
    (grid.at(y, x + 1).velocity.x - grid.at(y, x - 1).velocity.x + grid.at(y + 1, x).velocity.y
        - grid.at(y - 1, x).velocity.y)
        / 2.0
}

/// Central-difference gradient of the potential at `(y, x)`.
pub fn potential_gradient(grid: &Grid, y: i64, x: i64) -> Vec2 {
    Vec2::new(
        (grid.at(y, x + 1).potential - grid.at(y, x - 1).potential) / 2.0,
        (grid.at(y + 1, x).potential - grid.at(y - 1, x).potential) / 2.0,
    )
}

/// One Jacobi sweep of the potential Poisson equation, staged into `next_potential`:
/// `(phi(N) + phi(S) + phi(E) + phi(W) - div) / 4`.
pub fn clear_divergence(grid: &mut Grid) {
    grid.stage_active(
        |g, y, x| {
            let neighbours = g.at(y, x - 1).potential
                + g.at(y, x + 1).potential
                + g.at(y - 1, x).potential
                + g.at(y + 1, x).potential;
            (neighbours - divergence(g, y, x)) / 4.0
        },
        |cell, p| cell.next_potential = p,
    );
}

/// Run `iters` Jacobi sweeps, publishing the potential after each.
pub fn relax_potential(grid: &mut Grid, iters: usize) {
    for _ in 0..iters {
        clear_divergence(grid);
        grid.publish_potential();
    }
}

/// Subtract the potential gradient from every active cell's velocity.
/// Only potentials are read, so the write goes straight to the current velocity.
pub fn apply_velocity_correction(grid: &mut Grid) {
    grid.stage_active(potential_gradient, |cell, correction| cell.velocity -= correction);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::boundary::Inflow;
    use crate::solver::diagnostics::max_abs_divergence;

    const C: usize = 7;

    /// Quiet 15x15 grid with a single outward-pointing source around the center.
    fn spike_grid() -> Grid {
        let mut grid = Grid::new(15, 15, Inflow { density: 0.0, velocity: Vec2::ZERO }).unwrap();
        grid.init(None).unwrap();
        for y in 0..15 {
            for x in 0..15 {
                grid.set_cell(y, x, 0.0, Vec2::ZERO).unwrap();
            }
        }
        grid.set_cell(C + 1, C, 0.0, Vec2::new(0.0, 1.0)).unwrap();
        grid.set_cell(C - 1, C, 0.0, Vec2::new(0.0, -1.0)).unwrap();
        grid.set_cell(C, C + 1, 0.0, Vec2::new(1.0, 0.0)).unwrap();
        grid.set_cell(C, C - 1, 0.0, Vec2::new(-1.0, 0.0)).unwrap();
        grid
    }

    #[test]
    fn test_divergence_of_source() {
        let grid = spike_grid();
        let c = C as i64;
        assert_eq!(divergence(&grid, c, c), 2.0);
        assert_eq!(divergence(&grid, c, c + 2), -0.5);
        assert_eq!(divergence(&grid, 0, 0), 0.0);
    }

    #[test]
    fn test_divergence_uses_sentinel_at_edges() {
        let mut grid = Grid::new(3, 3, Inflow { density: 0.0, velocity: Vec2::new(2.0, 0.0) }).unwrap();
        grid.init(None).unwrap();
        grid.set_cell(1, 2, 0.0, Vec2::ZERO).unwrap();
        // vx(E) = sentinel 2, vx(W) = 2 from (1,1)
        assert_eq!(divergence(&grid, 1, 2), 0.0);
        // vx(E) = 0 from (1,2), vx(W) = 2 from (1,0)
        assert_eq!(divergence(&grid, 1, 1), -1.0);
    }

    #[test]
    fn test_jacobi_sweep_reads_previous_potential() {
        let mut grid = spike_grid();
        clear_divergence(&mut grid);
        assert_eq!(grid.at(C as i64, C as i64).potential, 0.0, "staged potential is not visible yet");
        grid.publish_potential();
        let c = C as i64;
        assert_eq!(grid.at(c, c).potential, -0.5);
        // div = -0.5 two cells out, previous potentials all zero
        assert_eq!(grid.at(c, c + 2).potential, 0.125);
        assert_eq!(grid.at(c, c + 1).potential, 0.0);
    }

    #[test]
    fn test_iterations_monotonically_reduce_max_divergence() {
        let initial = max_abs_divergence(&spike_grid());
        assert_eq!(initial, 2.0);

        let mut prev = initial;
        for iters in [1, 2, 3, 5, 10, 20, 40] {
            let mut grid = spike_grid();
            relax_potential(&mut grid, iters);
            apply_velocity_correction(&mut grid);
            let after = max_abs_divergence(&grid);
            assert!(after < initial, "iters={}: {} should be below initial {}", iters, after, initial);
            assert!(after <= prev + 1e-12, "iters={}: max divergence grew from {} to {}", iters, prev, after);
            prev = after;
        }
    }

    #[test]
    fn test_correction_without_potential_is_noop() {
        let mut grid = spike_grid();
        let before = grid.snapshot();
        apply_velocity_correction(&mut grid);
        assert_eq!(grid.snapshot(), before);
    }

    #[test]
    fn test_divergence_free_field_keeps_zero_potential() {
        let mut grid = Grid::new(6, 6, Inflow { density: 1.0, velocity: Vec2::new(3.0, -1.0) }).unwrap();
        grid.init(None).unwrap();
        relax_potential(&mut grid, 10);
        grid.for_each_active_cell(|y, x, c| {
            assert_eq!(c.potential, 0.0, "potential at ({}, {})", y, x);
        });
    }
}
