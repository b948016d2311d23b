use crate::grid::{CellView, Grid};
use crate::vec2::{lerp, Vec2};

/// Bilinear sample of density and velocity at a fractional position `(px, py)`.
/// Corners outside the grid resolve to the sentinel through `Grid::at`.
pub fn sample(grid: &Grid, px: f64, py: f64) -> (f64, Vec2) {
    let fx = px.floor();
    let fy = py.floor();
    let tx = px - fx;
    let ty = py - fy;
    let (x0, y0) = (fx as i64, fy as i64);

    let c00 = grid.at(y0, x0);
    let c01 = grid.at(y0, x0.saturating_add(1));
    let c10 = grid.at(y0.saturating_add(1), x0);
    let c11 = grid.at(y0.saturating_add(1), x0.saturating_add(1));

    let density = bilerp(&c00, &c01, &c10, &c11, tx, ty, |c| c.density, lerp);
    let velocity = bilerp(&c00, &c01, &c10, &c11, tx, ty, |c| c.velocity, Vec2::lerp);
    (density, velocity)
}

#[allow(clippy::too_many_arguments)]
fn bilerp<T: Copy>(
    c00: &CellView,
    c01: &CellView,
    c10: &CellView,
    c11: &CellView,
    tx: f64,
    ty: f64,
    field: impl Fn(&CellView) -> T,
    mix: impl Fn(T, T, f64) -> T,
) -> T {
    let top = mix(field(c00), field(c01), tx);
    let bottom = mix(field(c10), field(c11), tx);
    mix(top, bottom, ty)
}

/// Semi-Lagrangian transport: each active cell traces back along its own
/// velocity by `dt` and takes the interpolated values found there.
/// Results are staged, not published.
pub fn advect(grid: &mut Grid, dt: f64) {
    grid.stage_active(
        |g, y, x| {
            let v = g.at(y, x).velocity;
            let source = Vec2::new(x as f64, y as f64) - v * dt;
            sample(g, source.x, source.y)
        },
        |cell, (density, velocity)| {
            cell.next_density = density;
            cell.next_velocity = velocity;
        },
    );
}
