use std::{
    fmt::{self, Debug},
    ops::{AddAssign, Deref, DerefMut, MulAssign},
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::SerializeTuple,
};

/// Trait representing a phase-space point usable by the fixed-step solvers.
///
/// The solver only needs in-place scaling and accumulation plus read access
/// to the scalar components. The component count is fixed for the lifetime
/// of a run; every RHS and observer call sees the same length.
pub trait OdeState: Clone + Default + Debug + MulAssign<f64>
where
    for<'a> Self: AddAssign<&'a Self>,
{
    /// Number of scalar components in the state.
    fn dim(&self) -> usize;

    /// Value of component `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.dim()`.
    fn component(&self, i: usize) -> f64;

    /// Returns `true` if every component is finite (no NaN or infinity).
    fn is_finite(&self) -> bool {
        (0..self.dim()).all(|i| self.component(i).is_finite())
    }
}

/// A fixed-size array of `N` f64 components, the standard concrete state
/// for a first-order ODE system of dimension `N`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateArray<const N: usize>([f64; N]);

impl<const N: usize> StateArray<N> {
    pub fn new(array: [f64; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> Default for StateArray<N> {
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> From<[f64; N]> for StateArray<N> {
    fn from(array: [f64; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> AddAssign<&Self> for StateArray<N> {
    fn add_assign(&mut self, rhs: &Self) {
        for i in 0..N {
            self.0[i] += rhs.0[i];
        }
    }
}

impl<const N: usize> MulAssign<f64> for StateArray<N> {
    fn mul_assign(&mut self, rhs: f64) {
        for i in 0..N {
            self.0[i] *= rhs;
        }
    }
}

impl<const N: usize> OdeState for StateArray<N> {
    fn dim(&self) -> usize {
        N
    }

    fn component(&self, i: usize) -> f64 {
        self.0[i]
    }
}

impl<const N: usize> Deref for StateArray<N> {
    type Target = [f64; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for StateArray<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

// serde's derive does not cover const-generic arrays, so the impls are
// written out: a `StateArray<N>` serializes as a flat tuple of N numbers.

impl<const N: usize> Serialize for StateArray<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(N)?;
        for value in &self.0 {
            tup.serialize_element(value)?;
        }
        tup.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for StateArray<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArrayVisitor<const N: usize>;

        impl<'de, const N: usize> Visitor<'de> for ArrayVisitor<N> {
            type Value = StateArray<N>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a sequence of {N} numbers")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut array = [0.0; N];
                for (i, slot) in array.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                Ok(StateArray(array))
            }
        }

        deserializer.deserialize_tuple(N, ArrayVisitor)
    }
}
