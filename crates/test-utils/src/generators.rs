//! Deterministic synthetic point generators.
//!
//! All generators are seeded so repeated runs produce identical datasets,
//! which the idempotence tests rely on.

/// Small linear congruential generator (Knuth MMIX constants).
///
/// Good enough to scatter test points; not for anything statistical.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Next value uniformly in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Next value uniformly in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Uniformly scattered points inside `(min_x, min_y, max_x, max_y)`.
///
/// # Example
///
/// ```
/// use test_utils::uniform_points;
///
/// let points = uniform_points(7, 100, (0.0, 0.0, 10.0, 10.0));
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|&(x, y)| (0.0..10.0).contains(&x) && (0.0..10.0).contains(&y)));
/// ```
pub fn uniform_points(seed: u64, count: usize, bounds: (f64, f64, f64, f64)) -> Vec<(f64, f64)> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|_| (rng.range(min_x, max_x), rng.range(min_y, max_y)))
        .collect()
}

/// Points clustered around `center` with a roughly triangular falloff of
/// width `radius`, imitating dense urban hot spots.
pub fn clustered_points(
    seed: u64,
    count: usize,
    center: (f64, f64),
    radius: f64,
) -> Vec<(f64, f64)> {
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|_| {
            let dx = (rng.next_f64() + rng.next_f64() - 1.0) * radius;
            let dy = (rng.next_f64() + rng.next_f64() - 1.0) * radius;
            (center.0 + dx, center.1 + dy)
        })
        .collect()
}
