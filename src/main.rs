use std::path::PathBuf;

use anyhow::{Context, Result};

use fluidsim::config::{self, Config};
use fluidsim::renderer::{self, Palette, RenderConfig};
use fluidsim::solver::diagnostics;
use fluidsim::Simulation;

struct Defaults;

impl Defaults {
    const HEADLESS_STEPS: u64 = 100;
    const LOG_EVERY: u64 = 10;
}

fn is_headless(args: &[String]) -> bool {
    args.iter().any(|a| a == "--headless")
}

/// Value following `flag`, e.g. `--steps 200`.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_steps(args: &[String]) -> Result<u64> {
    match flag_value(args, "--steps") {
        Some(s) => s.parse().with_context(|| format!("invalid --steps value: {s}")),
        None => Ok(Defaults::HEADLESS_STEPS),
    }
}

fn build_simulation(cfg: &Config) -> Result<Simulation> {
    Simulation::new(
        cfg.grid.width,
        cfg.grid.height,
        cfg.inflow.inflow(),
        cfg.vent.vent(),
        cfg.physics.solver_params(),
    )
    .context("failed to build simulation grid")
}

fn palette(cfg: &Config) -> Palette {
    Palette {
        velocity_param: cfg.display.visual_velocity_param,
        density_param: cfg.display.visual_density_param,
        ..Palette::default()
    }
}

fn render_config(cfg: &Config) -> RenderConfig {
    RenderConfig::fit(cfg.display.width, cfg.display.height, cfg.grid.width, cfg.grid.height)
        .with_palette(palette(cfg))
}

fn log_diagnostics(sim: &Simulation) {
    let grid = sim.grid();
    log::info!(
        "step {:>5}: max|div|={:.4} density={:.1} ke={:.3} max_speed={:.3}",
        sim.steps(),
        diagnostics::max_abs_divergence(grid),
        diagnostics::total_density(grid),
        diagnostics::kinetic_energy(grid),
        diagnostics::max_speed(grid),
    );
}

fn run_headless(cfg: &Config, steps: u64, ppm: Option<PathBuf>) -> Result<()> {
    let mut sim = build_simulation(cfg)?;
    log::info!(
        "headless run: {}x{} grid, {} steps, dt={}",
        cfg.grid.width,
        cfg.grid.height,
        steps,
        sim.params().dt
    );
    for _ in 0..steps {
        sim.step();
        if sim.steps() % Defaults::LOG_EVERY == 0 {
            log_diagnostics(&sim);
        }
    }

    if let Some(path) = ppm {
        let rcfg = render_config(cfg);
        let rgba = renderer::render(&sim.snapshot(), &rcfg);
        let data = renderer::encode_ppm(&rgba, rcfg.frame_width, rcfg.frame_height);
        std::fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote final frame to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "window")]
mod window {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{anyhow, Result};
    use minifb::{Key, KeyRepeat, Window, WindowOptions};

    use fluidsim::config::Config;
    use fluidsim::renderer;
    use fluidsim::{Simulation, Snapshot};

    enum Command {
        TogglePause,
    }

    /// Channels connecting the window thread to the physics thread.
    struct PhysicsChannels {
        cmd_tx: mpsc::Sender<Command>,
        snap_rx: mpsc::Receiver<Snapshot>,
    }

    /// The physics thread owns the simulation and ticks it on a fixed cadence,
    /// publishing a snapshot after every completed step.
    fn spawn_physics_thread(
        mut sim: Simulation,
        interval: Duration,
        running: Arc<AtomicBool>,
    ) -> (PhysicsChannels, std::thread::JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (snap_tx, snap_rx) = mpsc::sync_channel::<Snapshot>(1);

        let handle = std::thread::spawn(move || {
            if snap_tx.send(sim.snapshot()).is_err() {
                return;
            }
            while running.load(Ordering::SeqCst) {
                let tick_start = Instant::now();
                while let Ok(cmd) = cmd_rx.try_recv() {
                    match cmd {
                        Command::TogglePause => sim.toggle_pause(),
                    }
                }
                if sim.tick() && snap_tx.send(sim.snapshot()).is_err() {
                    break;
                }
                let elapsed = tick_start.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        });

        (PhysicsChannels { cmd_tx, snap_rx }, handle)
    }

    pub fn run(cfg: &Config) -> Result<()> {
        let sim = super::build_simulation(cfg)?;
        let rcfg = super::render_config(cfg);
        let (fw, fh) = (rcfg.frame_width, rcfg.frame_height);

        let mut window = Window::new("fluidsim - space: pause/resume, esc: quit", fw, fh, WindowOptions::default())
            .map_err(|e| anyhow!("failed to create window: {e}"))?;
        window.set_target_fps(60);

        let running = Arc::new(AtomicBool::new(true));
        let interval = Duration::from_millis(cfg.display.step_interval_ms);
        let (channels, physics_thread) = spawn_physics_thread(sim, interval, running.clone());

        let mut rgba = Vec::new();
        let mut argb = vec![0u32; fw * fh];
        while window.is_open() && !window.is_key_down(Key::Escape) {
            if window.is_key_pressed(Key::Space, KeyRepeat::No) {
                let _ = channels.cmd_tx.send(Command::TogglePause);
            }

            // Drain to the newest finished step.
            let mut latest = None;
            while let Ok(snap) = channels.snap_rx.try_recv() {
                latest = Some(snap);
            }

            match latest {
                Some(snap) => {
                    renderer::render_into(&mut rgba, &snap, &rcfg);
                    renderer::rgba_to_argb(&rgba, &mut argb);
                    window
                        .update_with_buffer(&argb, fw, fh)
                        .map_err(|e| anyhow!("failed to present frame: {e}"))?;
                }
                None => window.update(),
            }
        }

        running.store(false, Ordering::SeqCst);
        drop(channels);
        let _ = physics_thread.join();
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let cfg = config::load();

    if is_headless(&args) || !cfg!(feature = "window") {
        let steps = parse_steps(&args)?;
        let ppm = flag_value(&args, "--ppm").map(PathBuf::from);
        return run_headless(&cfg, steps, ppm);
    }

    #[cfg(feature = "window")]
    window::run(&cfg)?;
    Ok(())
}
