//! Core traits for isomesh

/// A continuous scalar function over 3D space.
///
/// Implementations must be pure: the same coordinates always produce the
/// same value, and sampling never mutates shared state. This is what lets a
/// grid sample its cells from several threads and what keeps repeated
/// rebuilds from the same configuration bit-identical.
pub trait ScalarField: Send + Sync {
    /// Evaluate the field at `(x, y, z)`
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

impl<F> ScalarField for F
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync,
{
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self(x, y, z)
    }
}

/// A field with the same value everywhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantField(pub f64);

impl ScalarField for ConstantField {
    fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
        self.0
    }
}
