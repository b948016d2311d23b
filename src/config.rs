use serde::Deserialize;

use crate::solver::{Inflow, Rect, SolverParams, Vent};
use crate::vec2::Vec2;

pub const CONFIG_FILE: &str = "fluidsim.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub physics: PhysicsConfig,
    pub grid: GridConfig,
    pub inflow: InflowConfig,
    pub vent: VentConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub dt: f64,
    pub k_density: f64,
    pub k_velocity: f64,
    pub divergence_iters: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InflowConfig {
    pub density: f64,
    pub velocity: Vec2,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VentConfig {
    pub enabled: bool,
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
    pub split_y: i64,
    pub upper_velocity: Vec2,
    pub lower_velocity: Vec2,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    /// Delay between simulation ticks in window mode.
    pub step_interval_ms: u64,
    pub visual_velocity_param: f64,
    pub visual_density_param: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            grid: GridConfig::default(),
            inflow: InflowConfig::default(),
            vent: VentConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let p = SolverParams::default();
        Self {
            dt: p.dt,
            k_density: p.k_density,
            k_velocity: p.k_velocity,
            divergence_iters: p.divergence_iters,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { width: 100, height: 100 }
    }
}

impl Default for InflowConfig {
    fn default() -> Self {
        let inflow = Inflow::default();
        Self {
            density: inflow.density,
            velocity: inflow.velocity,
        }
    }
}

impl Default for VentConfig {
    fn default() -> Self {
        let vent = Vent::default();
        Self {
            enabled: true,
            x_min: vent.rect.x_min,
            x_max: vent.rect.x_max,
            y_min: vent.rect.y_min,
            y_max: vent.rect.y_max,
            split_y: vent.split_y,
            upper_velocity: vent.upper_velocity,
            lower_velocity: vent.lower_velocity,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            step_interval_ms: 60,
            visual_velocity_param: 80.0,
            visual_density_param: 0.1,
        }
    }
}

impl PhysicsConfig {
    pub fn solver_params(&self) -> SolverParams {
        SolverParams {
            dt: self.dt,
            k_density: self.k_density,
            k_velocity: self.k_velocity,
            divergence_iters: self.divergence_iters,
        }
    }
}

impl InflowConfig {
    pub fn inflow(&self) -> Inflow {
        Inflow {
            density: self.density,
            velocity: self.velocity,
        }
    }
}

impl VentConfig {
    /// `None` when the vent is disabled.
    pub fn vent(&self) -> Option<Vent> {
        if !self.enabled {
            return None;
        }
        Some(Vent {
            rect: Rect {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            },
            split_y: self.split_y,
            upper_velocity: self.upper_velocity,
            lower_velocity: self.lower_velocity,
        })
    }
}

pub fn parse(yaml: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Load `fluidsim.yaml` from the working directory, falling back to defaults.
pub fn load() -> Config {
    load_from(std::path::Path::new(CONFIG_FILE))
}

pub fn load_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        log::debug!("{} not found; using defaults", path.display());
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("failed to parse {}: {e}; using defaults", path.display());
                Config::default()
            }
        },
        Err(e) => {
            log::warn!("failed to read {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}
