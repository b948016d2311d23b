use crate::grid::Grid;
use crate::vec2::Vec2;

/// Single relaxation sweep of density and velocity toward their 4-neighbour mean.
/// `next = (current + dt*k*avg4) / (1 + dt*k)`; edge cells blend with the sentinel.
/// Results are staged, not published.
pub fn diffuse(grid: &mut Grid, dt: f64, k_density: f64, k_velocity: f64) {
    let a_density = dt * k_density;
    let a_velocity = dt * k_velocity;
    grid.stage_active(
        |g, y, x| {
            let n = g.at(y - 1, x);
            let s = g.at(y + 1, x);
            let e = g.at(y, x + 1);
            let w = g.at(y, x - 1);
            let here = g.at(y, x);

            let avg_density = (n.density + s.density + e.density + w.density) / 4.0;
            let avg_velocity = (n.velocity + s.velocity + e.velocity + w.velocity) / 4.0;

            let density = (here.density + a_density * avg_density) / (1.0 + a_density);
            let velocity = (here.velocity + avg_velocity * a_velocity) / (1.0 + a_velocity);
            (density, velocity)
        },
        |cell, (density, velocity): (f64, Vec2)| {
            cell.next_density = density;
            cell.next_velocity = velocity;
        },
    );
}
