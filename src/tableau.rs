/// Coefficients of an explicit Runge-Kutta method.
///
/// `a` is the (strictly lower-triangular) stage matrix, `b` the output
/// weights, and `c` the stage times. Only fixed-step methods are kept here,
/// so there is no embedded error-estimate row.
pub struct ButcherTableau<const STAGES: usize> {
    pub a: [[f64; STAGES]; STAGES],
    pub b: [f64; STAGES],
    pub c: [f64; STAGES],
}

impl ButcherTableau<1> {
    /// Forward Euler. First order; mostly useful as a convergence baseline.
    pub const EULER: Self = Self {
        a: [[0.]],
        b: [1.],
        c: [0.],
    };
}

impl ButcherTableau<2> {
    /// Explicit midpoint method, second order.
    pub const MIDPOINT: Self = Self {
        a: [[0., 0.], [1. / 2., 0.]],
        b: [0., 1.],
        c: [0., 1. / 2.],
    };
}

impl ButcherTableau<4> {
    /// The classical 4th-order Runge-Kutta method.
    ///
    /// Usage is `ButcherTableau::<4>::RK4`.
    pub const RK4: Self = Self {
        a: [
            [0., 0., 0., 0.],
            [1. / 2., 0., 0., 0.],
            [0., 1. / 2., 0., 0.],
            [0., 0., 1., 0.],
        ],
        b: [1. / 6., 1. / 3., 1. / 3., 1. / 6.],
        c: [0., 1. / 2., 1. / 2., 1.],
    };
}
