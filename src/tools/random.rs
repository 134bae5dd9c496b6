//! Random draws used by the weather stub and the campaign simulation.

use rand::Rng;

/// Source of uniform samples. Production code wraps a `rand` generator;
/// tests substitute a fixed value to pin outputs exactly.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform sample in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }
}

/// Adapter from any `rand::Rng` to [`RandomSource`].
#[derive(Debug)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Always returns the same sample. Values outside `[0, 1)` are clamped.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub f64);

#[cfg(test)]
impl RandomSource for FixedSource {
    fn next_unit(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
