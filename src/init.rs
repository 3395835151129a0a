use crate::state::{OdeState, StateArray};

/// Strategy for producing the initial state of a run, used when the seed is
/// computed rather than written down directly.
pub trait InitialState {
    type State: OdeState;
    fn initial_state(&self) -> Self::State;
}

/// Seeds a second-order system `(value, derivative)` from a reference
/// oracle evaluated near the start time.
///
/// This is for equations that are singular at their natural origin: start
/// integration at some `t0` past the singularity and bootstrap the seed
/// from a known-good reference function. The value is `f_ref(t0)` and the
/// derivative a central-difference estimate,
/// `(f_ref(t0 + h) − f_ref(t0 − h)) / 2h`, accurate to O(h²) on top of
/// whatever error the oracle itself carries.
///
/// The caller must pick `t0` so that `t0 − h` is still past the
/// singularity; that is not checked here.
pub struct OracleInitializer<F: Fn(f64) -> f64> {
    oracle: F,
    t0: f64,
    h: f64,
}

impl<F: Fn(f64) -> f64> OracleInitializer<F> {
    /// Default finite-difference offset.
    pub const DEFAULT_H: f64 = 1e-5;

    pub fn new(oracle: F, t0: f64) -> Self {
        Self {
            oracle,
            t0,
            h: Self::DEFAULT_H,
        }
    }

    pub fn with_offset(mut self, h: f64) -> Self {
        self.h = h;
        self
    }
}

impl<F: Fn(f64) -> f64> InitialState for OracleInitializer<F> {
    type State = StateArray<2>;

    fn initial_state(&self) -> StateArray<2> {
        let value = (self.oracle)(self.t0);
        let slope = ((self.oracle)(self.t0 + self.h) - (self.oracle)(self.t0 - self.h))
            / (2.0 * self.h);
        StateArray::new([value, slope])
    }
}
