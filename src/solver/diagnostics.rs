use crate::grid::Grid;

use super::projection::divergence;

/// Largest |divergence| over active cells.
pub fn max_abs_divergence(grid: &Grid) -> f64 {
    let mut max = 0.0_f64;
    grid.for_each_active_cell(|y, x, _| {
        max = max.max(divergence(grid, y as i64, x as i64).abs());
    });
    max
}

/// Sum of density over active cells.
pub fn total_density(grid: &Grid) -> f64 {
    let mut sum = 0.0;
    grid.for_each_active_cell(|_, _, c| sum += c.density);
    sum
}

/// Mean kinetic energy over active cells: KE = 0.5 * <|v|^2>.
pub fn kinetic_energy(grid: &Grid) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    grid.for_each_active_cell(|_, _, c| {
        sum += c.velocity.length_squared();
        count += 1;
    });
    if count > 0 { 0.5 * sum / count as f64 } else { 0.0 }
}

pub fn max_speed(grid: &Grid) -> f64 {
    let mut max = 0.0_f64;
    grid.for_each_active_cell(|_, _, c| max = max.max(c.velocity.length()));
    max
}
