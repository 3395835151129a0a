//! Fixed-step explicit Runge-Kutta integration with pluggable dynamics,
//! initializers, and observers.
//!
//! The pieces are deliberately small: an [`OdeModel`] supplies the
//! right-hand side `dx/dt = f(t, x)`, a [`RungeKutta`](rk::RungeKutta)
//! stepper advances the state at a constant step, and every `(time, state)`
//! sample goes to an [`Observer`](saving::Observer) — usually a
//! [`Trajectory`](saving::Trajectory), which the caller owns outright once
//! the run returns. Systems that are singular at their natural origin can
//! seed the run from a reference oracle via
//! [`OracleInitializer`](init::OracleInitializer).
//!
//! ```
//! use diffeq_fixed::{OdeModel, OdeProblem, error::OdeErrors, state::StateArray};
//!
//! struct Decay;
//!
//! impl OdeModel for Decay {
//!     type State = StateArray<1>;
//!     fn f(&mut self, _t: f64, x: &StateArray<1>, dxdt: &mut StateArray<1>)
//!         -> Result<(), OdeErrors>
//!     {
//!         dxdt[0] = -x[0];
//!         Ok(())
//!     }
//! }
//!
//! let trajectory = OdeProblem::new(Decay)
//!     .solve_fixed(&StateArray::new([1.0]), (0.0, 5.0), 0.01)
//!     .unwrap();
//! let values = trajectory.channel(0);
//! assert_eq!(values.len(), trajectory.times().len());
//! ```
//!
//! Adaptive step-size control is out of scope; there is no error
//! estimation and no interpolation onto the end time.

pub mod error;
pub mod init;
pub mod rk;
pub mod saving;
pub mod state;
pub mod sweep;
pub mod tableau;

use crate::{
    error::OdeErrors,
    init::InitialState,
    rk::RungeKutta,
    saving::{Observer, Trajectory},
    state::OdeState,
    tableau::ButcherTableau,
};

/// Trait for defining a dynamical system that can be numerically integrated.
///
/// Implementations compute the derivative at time `t` and state `x`,
/// storing the result in `dxdt`. The classical RK4 step evaluates this four
/// times per reported sample, so the function must not depend on call
/// ordering or shared mutable state across invocations.
pub trait OdeModel {
    type State: OdeState;

    fn f(
        &mut self,
        t: f64,
        x: &Self::State,
        dxdt: &mut Self::State,
    ) -> Result<(), OdeErrors>;
}

/// Rejects a span/step configuration before any stepping begins. Bad
/// configurations are errors, never clamped.
pub(crate) fn validate_fixed(tspan: (f64, f64), dt: f64) -> Result<(), OdeErrors> {
    let (t0, tf) = tspan;
    // an infinite endpoint would stall the step loop: -inf + dt is still -inf
    if !t0.is_finite() || !tf.is_finite() || !(t0 < tf) {
        return Err(OdeErrors::InvalidTspan { t0, tf });
    }
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(OdeErrors::InvalidStep { dt });
    }
    Ok(())
}

/// Container for an ODE problem: the model plus the checked entry points
/// for solving it with the classical fixed-step RK4 method.
///
/// Each `solve_fixed*` call is an independent run; nothing carries over
/// between runs except the model itself.
pub struct OdeProblem<Model: OdeModel> {
    model: Model,
}

impl<Model: OdeModel> OdeProblem<Model> {
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Integrates from `tspan.0` to `tspan.1` at step `dt` and returns the
    /// recorded trajectory, preallocated for the expected sample count.
    pub fn solve_fixed(
        &mut self,
        x0: &Model::State,
        tspan: (f64, f64),
        dt: f64,
    ) -> Result<Trajectory<Model::State>, OdeErrors> {
        validate_fixed(tspan, dt)?;
        let mut trajectory = Trajectory::for_span(tspan, dt);
        self.solve_fixed_with(x0, tspan, dt, &mut trajectory)?;
        Ok(trajectory)
    }

    /// Like [`solve_fixed`](Self::solve_fixed) but reports samples to a
    /// caller-supplied observer instead of building a trajectory.
    pub fn solve_fixed_with<Obs: Observer<Model::State>>(
        &mut self,
        x0: &Model::State,
        tspan: (f64, f64),
        dt: f64,
        observer: &mut Obs,
    ) -> Result<(), OdeErrors> {
        validate_fixed(tspan, dt)?;
        let mut solver = RungeKutta::new(ButcherTableau::<4>::RK4);
        solver.solve_fixed(&mut self.model, x0, tspan, dt, observer)
    }

    /// Convenience for runs whose seed comes from an
    /// [`InitialState`] strategy rather than a literal state.
    pub fn solve_fixed_init<Init>(
        &mut self,
        init: &Init,
        tspan: (f64, f64),
        dt: f64,
    ) -> Result<Trajectory<Model::State>, OdeErrors>
    where
        Init: InitialState<State = Model::State>,
    {
        let x0 = init.initial_state();
        self.solve_fixed(&x0, tspan, dt)
    }
}
