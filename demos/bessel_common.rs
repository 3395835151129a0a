//! Pieces shared by the Bessel demos: the series-summation reference and
//! Bessel's equation as a first-order system.

use diffeq_fixed::{OdeModel, error::OdeErrors, state::StateArray};

/// Bessel function of the first kind by series summation, the reference the
/// integrated trajectories are compared against.
pub fn bessel_jn(n: u32, x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = half.powi(n as i32);
    for m in 1..=n {
        term /= m as f64;
    }
    let mut sum = term;
    for m in 0..200 {
        term *= -(half * half) / ((m + 1) as f64 * (m + 1 + n) as f64);
        sum += term;
        if term.abs() < sum.abs() * 1e-17 {
            break;
        }
    }
    sum
}

/// Bessel's equation of order `n` as a first-order system in `(y, y')`.
/// Singular at t = 0; start past it and seed from the reference.
pub struct BesselEquation {
    pub n: f64,
}

impl OdeModel for BesselEquation {
    type State = StateArray<2>;

    fn f(
        &mut self,
        t: f64,
        x: &StateArray<2>,
        dxdt: &mut StateArray<2>,
    ) -> Result<(), OdeErrors> {
        dxdt[0] = x[1];
        dxdt[1] = -(1.0 / (t * t)) * (t * x[1] + (t * t - self.n * self.n) * x[0]);
        Ok(())
    }
}
