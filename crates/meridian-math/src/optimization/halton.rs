//! Halton low-discrepancy sequences.

const PRIMES: [u32; 8] = [2, 3, 5, 7, 11, 13, 17, 19];

/// Halton quasi-random sequence generator.
///
/// Produces points in the unit hypercube with better coverage than
/// pseudo-random sampling, used to multi-start the SABR simplex fit.
#[derive(Debug, Clone, Copy)]
pub struct HaltonSequence {
    dimension: usize,
}

impl HaltonSequence {
    /// Creates a generator for points of the given dimension (max 8).
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.min(PRIMES.len()),
        }
    }

    /// The dimension of generated points.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The `index`-th point of the sequence (1-based; index 0 yields zeros).
    #[must_use]
    pub fn point(&self, index: u32) -> Vec<f64> {
        (0..self.dimension)
            .map(|d| radical_inverse(index, PRIMES[d]))
            .collect()
    }

    /// The first `length` points of the sequence, starting at index 1.
    #[must_use]
    pub fn generate(&self, length: u32) -> Vec<Vec<f64>> {
        (1..=length).map(|i| self.point(i)).collect()
    }
}

/// Van der Corput radical inverse of `index` in the given base.
fn radical_inverse(mut index: u32, base: u32) -> f64 {
    let b = f64::from(base);
    let mut inv = 1.0 / b;
    let mut result = 0.0;
    while index > 0 {
        result += f64::from(index % base) * inv;
        index /= base;
        inv /= b;
    }
    result
}
