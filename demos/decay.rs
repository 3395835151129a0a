//! Minimal end-to-end run: exponential decay at a fixed step, printed
//! once per simulated second alongside the closed-form solution.

use std::error::Error;

use diffeq_fixed::{OdeModel, OdeProblem, error::OdeErrors, state::StateArray};

struct Decay {
    rate: f64,
}

impl OdeModel for Decay {
    type State = StateArray<1>;

    fn f(
        &mut self,
        _t: f64,
        x: &StateArray<1>,
        dxdt: &mut StateArray<1>,
    ) -> Result<(), OdeErrors> {
        dxdt[0] = -self.rate * x[0];
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut problem = OdeProblem::new(Decay { rate: 1.0 });
    let trajectory = problem.solve_fixed(&StateArray::new([1.0]), (0.0, 10.0), 0.001)?;

    println!("{:>10}  {:>12}  {:>12}", "t", "rk4", "exact");
    for (t, x) in trajectory.times().iter().zip(trajectory.states()) {
        if t.fract() < 1e-9 {
            println!("{t:10.3}  {:12.8}  {:12.8}", x[0], (-t).exp());
        }
    }
    Ok(())
}
