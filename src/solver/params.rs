/// Fixed per-step solver constants.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams {
    /// Timestep used by diffusion and advection.
    pub dt: f64,
    pub k_density: f64,
    pub k_velocity: f64,
    /// Jacobi sweeps of the potential solve per step.
    pub divergence_iters: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            dt: 0.1,
            k_density: 1.0,
            k_velocity: 1.0,
            divergence_iters: 10,
        }
    }
}

impl SolverParams {
    /// Parameters with diffusion switched off, leaving advection and projection.
    pub fn inviscid() -> Self {
        Self {
            k_density: 0.0,
            k_velocity: 0.0,
            ..Self::default()
        }
    }
}
