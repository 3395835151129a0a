//! Integrates Bessel's equation for several orders in parallel, one engine
//! per run, and prints the final sample of each trajectory.

use std::error::Error;

use diffeq_fixed::{
    init::{InitialState, OracleInitializer},
    sweep::Sweep,
};

mod bessel_common;
use bessel_common::{BesselEquation, bessel_jn};

fn main() -> Result<(), Box<dyn Error>> {
    let t_min = 0.01;

    let cases: Vec<_> = (0..=5)
        .map(|order| {
            let init = OracleInitializer::new(move |t| bessel_jn(order, t), t_min);
            (
                BesselEquation { n: order as f64 },
                init.initial_state(),
            )
        })
        .collect();

    let results = Sweep::new((t_min, 20.0), 0.001)
        .with_progress()
        .solve_all(cases)?;

    for (order, trajectory) in results.iter().enumerate() {
        let (t, x) = trajectory.last().expect("run produced no samples");
        println!(
            "J{order}({t:.3}) = {:+.9}   (series: {:+.9})",
            x[0],
            bessel_jn(order as u32, t)
        );
    }
    Ok(())
}
