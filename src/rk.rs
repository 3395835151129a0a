use std::array;

use crate::{
    OdeModel, error::OdeErrors, saving::Observer, state::OdeState, tableau::ButcherTableau,
};

// Preallocated buffers for intermediate stage calculations, reused across
// every step of a solve.
struct RkBuffers<State: OdeState, const STAGES: usize> {
    k: [State; STAGES],
    stage: State,
    scaled: State,
}

impl<State: OdeState, const STAGES: usize> Default for RkBuffers<State, STAGES> {
    fn default() -> Self {
        Self {
            k: array::from_fn(|_| State::default()),
            stage: State::default(),
            scaled: State::default(),
        }
    }
}

/// Explicit Runge-Kutta stepper driven by a [`ButcherTableau`].
///
/// The stepper owns its working state and stage buffers, so a single
/// instance allocates once and can be reused across runs. Independent runs
/// in parallel each need their own instance; nothing here is shared.
pub struct RungeKutta<State: OdeState, const STAGES: usize> {
    x: State,
    y: State,
    tableau: ButcherTableau<STAGES>,
    buffers: RkBuffers<State, STAGES>,
}

impl<State: OdeState, const STAGES: usize> RungeKutta<State, STAGES> {
    pub fn new(tableau: ButcherTableau<STAGES>) -> Self {
        Self {
            x: State::default(),
            y: State::default(),
            tableau,
            buffers: RkBuffers::default(),
        }
    }

    /// Integrates from `tspan.0` to `tspan.1` at a constant step `dt`,
    /// reporting every sample to `observer`: once with the initial
    /// condition, then once after each completed step.
    ///
    /// Stepping continues while the next time lands at or before `tspan.1`
    /// (within a floating-point tolerance), so when `dt` does not evenly
    /// divide the interval the last reported time falls short of the end —
    /// there is no interpolation onto the endpoint.
    ///
    /// The span and step are assumed validated by the caller; see
    /// [`OdeProblem`](crate::OdeProblem) for the checked front-end.
    pub fn solve_fixed<Model, Obs>(
        &mut self,
        model: &mut Model,
        x0: &State,
        tspan: (f64, f64),
        dt: f64,
        observer: &mut Obs,
    ) -> Result<(), OdeErrors>
    where
        Model: OdeModel<State = State>,
        Obs: Observer<State>,
    {
        let (t0, tf) = tspan;
        let mut t = t0;
        self.x.clone_from(x0);
        observer.record(t, &self.x)?;

        // absorbs accumulated summation error when dt divides the span
        let tol = dt * 1e-9;
        while t + dt <= tf + tol {
            self.step(model, t, dt)?;
            t += dt;
            self.x.clone_from(&self.y);
            observer.record(t, &self.x)?;
        }
        Ok(())
    }

    /// Advances the internal state once from `t` by `h`, leaving the result
    /// in the output buffer. Errors if the model reports one or produces a
    /// non-finite derivative, before anything downstream sees the sample.
    fn step<Model: OdeModel<State = State>>(
        &mut self,
        model: &mut Model,
        t: f64,
        h: f64,
    ) -> Result<(), OdeErrors> {
        let RkBuffers { k, stage, scaled } = &mut self.buffers;

        model.f(t, &self.x, &mut k[0])?;
        if !k[0].is_finite() {
            return Err(OdeErrors::NonFiniteDerivative { t });
        }

        for s in 1..STAGES {
            // intermediate point: x + h * sum(a[s][i] * k[i])
            *stage = State::default();
            for i in 0..s {
                let a = self.tableau.a[s][i];
                if a == 0.0 {
                    continue;
                }
                scaled.clone_from(&k[i]);
                *scaled *= a;
                *stage += &*scaled;
            }
            *stage *= h;
            *stage += &self.x;

            let ts = t + self.tableau.c[s] * h;
            model.f(ts, stage, &mut k[s])?;
            if !k[s].is_finite() {
                return Err(OdeErrors::NonFiniteDerivative { t: ts });
            }
        }

        // combine: y = x + h * sum(b[s] * k[s])
        self.y.clone_from(&self.x);
        for s in 0..STAGES {
            scaled.clone_from(&k[s]);
            *scaled *= self.tableau.b[s] * h;
            self.y += &*scaled;
        }
        Ok(())
    }
}

impl<State: OdeState> RungeKutta<State, 4> {
    /// Stepper preloaded with the classical RK4 tableau.
    pub fn rk4() -> Self {
        Self::new(ButcherTableau::<4>::RK4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{saving::Trajectory, state::StateArray};
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

    fn decay_error_at(dt: f64) -> f64 {
        let mut model = Decay { rate: 1.0 };
        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::new();
        solver
            .solve_fixed(
                &mut model,
                &StateArray::new([1.0]),
                (0.0, 2.0),
                dt,
                &mut trajectory,
            )
            .unwrap();
        let (t, x) = trajectory.last().unwrap();
        (x[0] - (-t).exp()).abs()
    }

    #[test]
    fn rk4_converges_at_fourth_order() {
        // halving the step should shrink the global error ~16x
        let mut dt = 0.1;
        let mut prev = decay_error_at(dt);
        for _ in 0..3 {
            dt /= 2.0;
            let err = decay_error_at(dt);
            let ratio = prev / err;
            assert!(
                (10.0..25.0).contains(&ratio),
                "expected ~16x error reduction, got {ratio}"
            );
            prev = err;
        }
    }

    fn tableau_error_at<const STAGES: usize>(
        tableau: ButcherTableau<STAGES>,
        dt: f64,
    ) -> f64 {
        let mut model = Decay { rate: 1.0 };
        let mut solver = RungeKutta::new(tableau);
        let mut trajectory = Trajectory::new();
        solver
            .solve_fixed(
                &mut model,
                &StateArray::new([1.0]),
                (0.0, 1.0),
                dt,
                &mut trajectory,
            )
            .unwrap();
        let (t, x) = trajectory.last().unwrap();
        (x[0] - (-t).exp()).abs()
    }

    #[test]
    fn euler_converges_at_first_order() {
        let coarse = tableau_error_at(ButcherTableau::<1>::EULER, 0.01);
        let fine = tableau_error_at(ButcherTableau::<1>::EULER, 0.005);
        let ratio = coarse / fine;
        assert!((1.7..2.3).contains(&ratio), "got ratio {ratio}");
    }

    #[test]
    fn midpoint_converges_at_second_order() {
        let coarse = tableau_error_at(ButcherTableau::<2>::MIDPOINT, 0.01);
        let fine = tableau_error_at(ButcherTableau::<2>::MIDPOINT, 0.005);
        let ratio = coarse / fine;
        assert!((3.4..4.6).contains(&ratio), "got ratio {ratio}");
    }

    #[test]
    fn harmonic_oscillator_stays_accurate() {
        // x'' = -x integrated as a 2d system, against the closed form
        struct Oscillator;
        impl OdeModel for Oscillator {
            type State = StateArray<2>;
            fn f(
                &mut self,
                _t: f64,
                x: &StateArray<2>,
                dxdt: &mut StateArray<2>,
            ) -> Result<(), OdeErrors> {
                dxdt[0] = x[1];
                dxdt[1] = -x[0];
                Ok(())
            }
        }

        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::new();
        solver
            .solve_fixed(
                &mut Oscillator,
                &StateArray::new([1.0, 0.0]),
                (0.0, 10.0),
                0.01,
                &mut trajectory,
            )
            .unwrap();

        for (t, x) in trajectory.times().iter().zip(trajectory.states()) {
            assert_abs_diff_eq!(x[0], t.cos(), epsilon = 1e-7);
            assert_abs_diff_eq!(x[1], -t.sin(), epsilon = 1e-7);
        }
    }

    #[test]
    fn sample_count_matches_fixed_step_policy() {
        let mut model = Decay { rate: 1.0 };
        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::for_span((0.01, 20.0), 0.001);
        solver
            .solve_fixed(
                &mut model,
                &StateArray::new([1.0]),
                (0.01, 20.0),
                0.001,
                &mut trajectory,
            )
            .unwrap();

        let expected = ((20.0 - 0.01) / 0.001) as usize + 1; // 19991
        let count = trajectory.len() as i64;
        assert!(
            (count - expected as i64).abs() <= 1,
            "expected ~{expected} samples, got {count}"
        );
    }

    #[test]
    fn times_are_uniform_and_start_at_t0() {
        let mut model = Decay { rate: 0.5 };
        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::new();
        solver
            .solve_fixed(
                &mut model,
                &StateArray::new([2.0]),
                (0.25, 1.25),
                0.05,
                &mut trajectory,
            )
            .unwrap();

        let times = trajectory.times();
        assert_abs_diff_eq!(times[0], 0.25);
        for pair in times.windows(2) {
            assert_abs_diff_eq!(pair[1] - pair[0], 0.05, epsilon = 1e-12);
        }
    }

    #[test]
    fn last_sample_stops_short_when_step_does_not_divide_span() {
        let mut model = Decay { rate: 1.0 };
        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::new();
        // 0.3 does not divide 1.0: samples at 0, 0.3, 0.6, 0.9
        solver
            .solve_fixed(
                &mut model,
                &StateArray::new([1.0]),
                (0.0, 1.0),
                0.3,
                &mut trajectory,
            )
            .unwrap();
        assert_eq!(trajectory.len(), 4);
        assert_abs_diff_eq!(trajectory.times()[3], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        let run = || {
            let mut model = Decay { rate: 1.3 };
            let mut solver = RungeKutta::rk4();
            let mut trajectory = Trajectory::new();
            solver
                .solve_fixed(
                    &mut model,
                    &StateArray::new([0.7]),
                    (0.0, 5.0),
                    0.01,
                    &mut trajectory,
                )
                .unwrap();
            trajectory
        };
        let a = run();
        let b = run();
        assert_eq!(a.times(), b.times());
        assert_eq!(a.states(), b.states());
    }

    #[test]
    fn non_finite_derivative_aborts_the_run() {
        // derivative turns NaN partway through the span, mid-grid so the
        // failing evaluation is an intermediate stage
        struct Pole;
        impl OdeModel for Pole {
            type State = StateArray<1>;
            fn f(
                &mut self,
                t: f64,
                _x: &StateArray<1>,
                dxdt: &mut StateArray<1>,
            ) -> Result<(), OdeErrors> {
                dxdt[0] = if t < 0.42 { 1.0 } else { f64::NAN };
                Ok(())
            }
        }

        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::new();
        let result = solver.solve_fixed(
            &mut Pole,
            &StateArray::new([0.0]),
            (0.0, 1.0),
            0.1,
            &mut trajectory,
        );

        assert!(matches!(
            result,
            Err(OdeErrors::NonFiniteDerivative { .. })
        ));
        // nothing from the failed step was recorded
        for t in trajectory.times() {
            assert!(*t < 0.42);
        }
        for x in trajectory.states() {
            assert!(x.is_finite());
        }
    }

    #[test]
    fn model_error_aborts_the_run() {
        // model refuses to evaluate past a cutoff that falls mid-grid, so
        // the failing call is an intermediate stage
        struct Cutoff;
        impl OdeModel for Cutoff {
            type State = StateArray<1>;
            fn f(
                &mut self,
                t: f64,
                _x: &StateArray<1>,
                dxdt: &mut StateArray<1>,
            ) -> Result<(), OdeErrors> {
                if t >= 0.42 {
                    return Err(OdeErrors::Model("cutoff reached".into()));
                }
                dxdt[0] = 1.0;
                Ok(())
            }
        }

        let mut solver = RungeKutta::rk4();
        let mut trajectory = Trajectory::new();
        let result = solver.solve_fixed(
            &mut Cutoff,
            &StateArray::new([0.0]),
            (0.0, 1.0),
            0.1,
            &mut trajectory,
        );

        assert!(matches!(result, Err(OdeErrors::Model(_))));
        // only the samples preceding the failed step survive
        assert_eq!(trajectory.len(), 5);
        for t in trajectory.times() {
            assert!(*t < 0.42);
        }
    }
}
