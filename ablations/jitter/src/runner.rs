//! 程序运行函数.

use crate::config::Config;
use crate::result::{AblationResult, Level};
use ndarray::Array2;
use needle_berry::summary::{evaluate_pair, Summary};
use needle_berry::EvalSpec;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::thread;
use std::time::Instant;
use utils::synth::{needle_pair, Needle, Perturbation};

/// 一组只改变单个扰动量的实验.
struct Sweep {
    name: &'static str,
    levels: Vec<Perturbation>,
}

fn sweeps() -> [Sweep; 3] {
    [
        Sweep {
            name: "jitter",
            levels: [0.0, 0.5, 1.0, 2.0, 4.0]
                .map(|jitter| Perturbation {
                    jitter,
                    ..Default::default()
                })
                .to_vec(),
        },
        Sweep {
            name: "tilt",
            levels: [0.0, 1.0, 5.0, 15.0]
                .map(|tilt| Perturbation {
                    tilt,
                    ..Default::default()
                })
                .to_vec(),
        },
        Sweep {
            name: "offset",
            levels: [0.0, 2.0, 8.0, 32.0]
                .map(|offset| Perturbation {
                    offset,
                    ..Default::default()
                })
                .to_vec(),
        },
    ]
}

/// 在给定扰动下评估所有真值针.
fn run_level(gts: &[Needle], p: &Perturbation, config: &Config, spec: &EvalSpec) -> Level {
    let shape = (config.size, config.size);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));

    let start = Instant::now();
    let owned: Vec<(Array2<f64>, Array2<f64>)> = gts
        .iter()
        .map(|gt| needle_pair(gt, p, shape, &mut rng))
        .collect();
    let results: Vec<_> = owned
        .par_iter()
        .map(|(pred, mask)| evaluate_pair(pred.view(), mask.view(), spec))
        .collect();
    let summary: Summary = results.iter().collect();

    Level::new(*p, summary, start.elapsed())
}

/// 实际运行.
pub fn run(config: &Config) -> AblationResult {
    let spec = config.eval_spec();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let gts: Vec<Needle> = (0..config.samples)
        .map(|_| Needle::random(&mut rng, config.max_tilt, config.max_offset))
        .collect();

    println!("Running ablation studies...");
    thread::scope(|s| {
        let (gts, spec) = (&gts, &spec);
        let handles = sweeps().map(|sweep| {
            s.spawn(move || {
                let levels: Vec<Level> = sweep
                    .levels
                    .iter()
                    .map(|p| {
                        log::debug!("{}: {p:?}", sweep.name);
                        run_level(gts, p, config, spec)
                    })
                    .collect();
                (sweep.name, levels)
            })
        });

        AblationResult::from_iter(
            handles
                .into_iter()
                .map(|th| th.join().expect("Thread joining error")),
        )
    })
}
