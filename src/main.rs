use octsim::{bench_forces, bench_steps, ScenarioConfig, Simulation};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Barnes-Hut n-body simulation, headless")]
struct Args {
    /// Scenario file; relative names are looked up in `scenarios/`
    #[arg(short, long = "file", default_value = "two_body.yaml")]
    file_name: PathBuf,

    /// Stop after this many steps even if `t_end` is not reached
    #[arg(long)]
    steps: Option<usize>,

    /// Log diagnostics every K steps
    #[arg(long, default_value_t = 100)]
    report_every: usize,

    /// Run the direct vs Barnes-Hut timing benchmark instead
    #[arg(long)]
    bench: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

// resolve here to keep main clean
fn scenario_path(file_name: &Path) -> PathBuf {
    if file_name.is_absolute() || file_name.exists() {
        return file_name.to_path_buf();
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.bench {
        bench_forces(&[200, 400, 800, 1600, 3200, 6400]);
        bench_steps(&[200, 400, 800, 1600, 3200], 3);
        return Ok(());
    }

    let path = scenario_path(&args.file_name);
    let cfg = ScenarioConfig::load(&path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut sim = Simulation::build_scenario(cfg, base_dir)?;

    let start = sim.diagnostics();
    info!(
        t_end = sim.parameters.t_end,
        dt = sim.dt(),
        energy = start.total_energy(),
        "starting run"
    );

    let every = args.report_every.max(1);
    let mut steps = 0usize;
    while sim.system.t < sim.parameters.t_end && args.steps.map_or(true, |m| steps < m) {
        let report = sim.step().with_context(|| format!("step {steps} failed at t = {}", sim.system.t))?;
        steps += 1;

        if steps % every == 0 {
            let d = sim.diagnostics();
            info!(
                step = steps,
                t = report.t,
                advanced = report.advanced,
                out_of_bounds = report.out_of_bounds,
                tree_height = report.tree.as_ref().map_or(0, |t| t.height()),
                energy = d.total_energy(),
                momentum = d.momentum.norm(),
                "progress"
            );
        }
    }

    let end = sim.diagnostics();
    let drift = if start.total_energy() != 0.0 {
        (end.total_energy() - start.total_energy()) / start.total_energy().abs()
    } else {
        0.0
    };
    info!(steps, t = sim.system.t, energy_drift = drift, "run finished");

    Ok(())
}
