//! Computes the Bessel function J4 by integrating Bessel's equation with
//! fixed-step RK4, then plots it against a series-summation reference.
//!
//! The equation is singular at t = 0, so integration starts just past it
//! and the seed comes from the reference oracle.

use std::error::Error;

use diffeq_fixed::{OdeProblem, init::OracleInitializer};
use plotters::prelude::*;

mod bessel_common;
use bessel_common::{BesselEquation, bessel_jn};

const ORDER: u32 = 4;

// Start past 0 to avoid the singularity.
const T_MIN: f64 = 0.01;
const T_MAX: f64 = 20.0;
const T_STEP: f64 = 0.001;

fn main() -> Result<(), Box<dyn Error>> {
    let oracle = |t: f64| bessel_jn(ORDER, t);

    let mut problem = OdeProblem::new(BesselEquation { n: ORDER as f64 });
    let init = OracleInitializer::new(oracle, T_MIN);
    let trajectory = problem.solve_fixed_init(&init, (T_MIN, T_MAX), T_STEP)?;

    let times = trajectory.times();
    let integrated = trajectory.channel(0);
    let reference: Vec<f64> = times.iter().map(|t| oracle(*t)).collect();

    let worst = integrated
        .iter()
        .zip(&reference)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);
    println!(
        "{} samples, max |integrated - series| = {worst:.3e}",
        trajectory.len()
    );

    let root = BitMapBackend::new("bessel.png", (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("J{ORDER}: fixed-step RK4 vs series"), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(T_MIN..T_MAX, -0.5..0.6)?;
    chart.configure_mesh().draw()?;

    chart
        .draw_series(LineSeries::new(
            times.iter().copied().zip(integrated),
            &BLUE,
        ))?
        .label("RK4")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart
        .draw_series(LineSeries::new(
            times.iter().copied().zip(reference),
            &RED,
        ))?
        .label("series")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart.configure_series_labels().border_style(&BLACK).draw()?;
    root.present()?;
    println!("wrote bessel.png");
    Ok(())
}
