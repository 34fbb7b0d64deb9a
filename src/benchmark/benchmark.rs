use std::time::Instant;

use crate::simulation::barnes_hut::{BarnesHutTree, TreeOptions};
use crate::simulation::engine::{Engine, ForceModel};
use crate::simulation::forces::{direct_forces, tree_forces};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Simulation;
use crate::simulation::states::Body;
use crate::simulation::vector::NVec3;

/// Deterministic body set of size `n`, no rand needed
pub fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(x, NVec3::zeros(), 1.0).with_radius(0.01)
        })
        .collect()
}

fn make_engine(force_model: ForceModel, parallel: bool) -> Engine {
    Engine {
        enable_z: true,
        force_model,
        theta: 0.7,
        radius: 6.0,
        parallel,
        ..Engine::default()
    }
}

fn make_params() -> Parameters {
    Parameters {
        t_end: 100.0,
        dt: 0.001,
        eps2: 1e-4,
        seed: 42,
        G: 0.1,
    }
}

/// Time one force pass, direct vs Barnes–Hut (tree build included)
pub fn bench_forces(ns: &[usize]) {
    let params = make_params();
    let engine = make_engine(ForceModel::BarnesHut, false);
    let opts = TreeOptions::new(&engine, &params);

    println!("N,direct_ms,bh_ms,bh_par_ms");
    for &n in ns {
        let template = make_bodies(n);
        let active = vec![true; n];

        let mut bodies = template.clone();
        let t0 = Instant::now();
        let direct_ok = direct_forces(&mut bodies, &active, params.G, params.eps2, false).is_ok();
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0;

        let timed_tree = |parallel: bool| {
            let mut bodies = template.clone();
            let t = Instant::now();
            let (tree, _) = BarnesHutTree::build(&bodies, engine.root_bounds(), opts);
            let ok = tree_forces(&tree, &mut bodies, &active, parallel).is_ok();
            (t.elapsed().as_secs_f64() * 1000.0, ok)
        };
        let (ms_bh, bh_ok) = timed_tree(false);
        let (ms_par, par_ok) = timed_tree(true);

        if !(direct_ok && bh_ok && par_ok) {
            println!("{n},failed,failed,failed");
            continue;
        }
        println!("{n},{ms_direct:.6},{ms_bh:.6},{ms_par:.6}");
    }
}

/// Time full simulation steps, direct vs Barnes–Hut
pub fn bench_steps(ns: &[usize], steps: usize) {
    println!("N,direct_step_ms,bh_step_ms");
    for &n in ns {
        let mut per_model = Vec::with_capacity(2);
        for model in [ForceModel::Direct, ForceModel::BarnesHut] {
            let Ok(mut sim) = Simulation::new(make_engine(model, false), make_params(), make_bodies(n)) else {
                per_model.push(f64::NAN);
                continue;
            };
            let t = Instant::now();
            for _ in 0..steps {
                if sim.step().is_err() {
                    break;
                }
            }
            per_model.push(t.elapsed().as_secs_f64() * 1000.0 / steps.max(1) as f64);
        }
        println!("{},{:.6},{:.6}", n, per_model[0], per_model[1]);
    }
}
