//! Seedable Xorshift64 generator used to scatter particles.
//!
//! The browser build seeds it from `Math.random()`, the CLI from `--seed`, so
//! a headless render with a fixed seed always lays out the same field.

/// Xorshift64 PRNG with shifts (13, 7, 17).
///
/// A seed of 0 is a fixed point of the algorithm and is replaced with a
/// non-zero constant.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const ZERO_SEED_REPLACEMENT: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        let state = match seed {
            0 => Self::ZERO_SEED_REPLACEMENT,
            s => s,
        };
        Self { state }
    }

    /// Returns the next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.state = s;
        s
    }

    /// Uniform `f64` in [0, 1) built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform `f64` in [min, max). Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        let v = min + self.next_f64() * (max - min);
        // Rounding can land exactly on `max` for wide ranges.
        if v >= max {
            min
        } else {
            v
        }
    }
}
