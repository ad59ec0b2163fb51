//! Random enrolled-count generation.
//!
//! The draw interval for a row is `[ceil(lower * capacity), ceil(upper * capacity)]`,
//! sampled uniformly with both endpoints included. The caller supplies the RNG so
//! tests can replay a run from a fixed seed.

use rand::Rng;

/// Pick an enrolled count for a row of the given capacity.
///
/// - `capacity <= 0` always yields `0` and leaves `rng` untouched.
/// - An inverted ratio pair is swapped here, independently of any earlier
///   validation warning.
/// - The lower bound is clamped at `0`, and the upper bound at the lower bound.
pub fn pick_enrolled<R: Rng + ?Sized>(rng: &mut R, capacity: i64, lower_ratio: f64, upper_ratio: f64) -> i64 {
    if capacity <= 0 {
        return 0;
    }

    let (low, high) = draw_bounds(capacity, lower_ratio, upper_ratio);
    rng.gen_range(low..=high)
}

/// Inclusive `(low, high)` interval used by `pick_enrolled` for a positive capacity.
pub fn draw_bounds(capacity: i64, lower_ratio: f64, upper_ratio: f64) -> (i64, i64) {
    let cap = capacity as f64;
    let mut low = (lower_ratio * cap).ceil() as i64;
    let mut high = (upper_ratio * cap).ceil() as i64;

    if low > high {
        std::mem::swap(&mut low, &mut high);
    }

    let low = low.max(0);
    let high = high.max(low);
    (low, high)
}
