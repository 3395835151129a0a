use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::{OdeModel, OdeProblem, error::OdeErrors, saving::Trajectory, state::OdeState};

/// Runs a family of independent fixed-step problems in parallel.
///
/// Every case gets its own model, engine, and trajectory, so nothing is
/// shared between runs and the output is deterministic: results come back
/// in submission order regardless of scheduling.
pub struct Sweep {
    tspan: (f64, f64),
    dt: f64,
    progress: bool,
}

impl Sweep {
    pub fn new(tspan: (f64, f64), dt: f64) -> Self {
        Self {
            tspan,
            dt,
            progress: false,
        }
    }

    /// Shows a progress bar while the runs execute.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    /// Solves every `(model, x0)` case with RK4 at the configured span and
    /// step. The first failing run aborts the sweep.
    pub fn solve_all<Model>(
        &self,
        cases: Vec<(Model, Model::State)>,
    ) -> Result<Vec<Trajectory<Model::State>>, OdeErrors>
    where
        Model: OdeModel + Send,
        Model::State: OdeState + Send,
    {
        // reject a bad configuration before spawning anything
        crate::validate_fixed(self.tspan, self.dt)?;

        let bar = if self.progress {
            Some(ProgressBar::new(cases.len() as u64))
        } else {
            None
        };

        let results: Result<Vec<_>, OdeErrors> = cases
            .into_par_iter()
            .map(|(model, x0)| {
                let trajectory = OdeProblem::new(model).solve_fixed(&x0, self.tspan, self.dt)?;
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
                Ok(trajectory)
            })
            .collect();

        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateArray;
    use approx::assert_abs_diff_eq;

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

    #[test]
    fn results_come_back_in_submission_order() {
        let cases: Vec<_> = (1..=8)
            .map(|i| (Decay { rate: i as f64 * 0.1 }, StateArray::new([1.0])))
            .collect();

        let sweep = Sweep::new((0.0, 1.0), 0.01);
        let results = sweep.solve_all(cases).unwrap();

        assert_eq!(results.len(), 8);
        for (i, trajectory) in results.iter().enumerate() {
            let rate = (i + 1) as f64 * 0.1;
            let (t, x) = trajectory.last().unwrap();
            assert_abs_diff_eq!(x[0], (-rate * t).exp(), epsilon = 1e-9);
        }
    }

    #[test]
    fn sweep_matches_sequential_runs_exactly() {
        let build = || (Decay { rate: 0.7 }, StateArray::new([2.0]));

        let parallel = Sweep::new((0.0, 2.0), 0.02)
            .solve_all(vec![build(), build()])
            .unwrap();
        let (model, x0) = build();
        let sequential = OdeProblem::new(model)
            .solve_fixed(&x0, (0.0, 2.0), 0.02)
            .unwrap();

        for trajectory in &parallel {
            assert_eq!(trajectory.times(), sequential.times());
            assert_eq!(trajectory.states(), sequential.states());
        }
    }

    #[test]
    fn invalid_configuration_fails_before_running() {
        let sweep = Sweep::new((1.0, 0.0), 0.01);
        let result = sweep.solve_all(vec![(Decay { rate: 1.0 }, StateArray::new([1.0]))]);
        assert!(matches!(result, Err(OdeErrors::InvalidTspan { .. })));
    }
}
