// SPDX-License-Identifier: Apache-2.0

use rand::RngCore;

/// The two draws the search needs from its random generator.
pub trait RandomSource {
    /// Uniform integer in `[min, max_exclusive)`.
    fn uniform_int(&mut self, min: u32, max_exclusive: u32) -> u32;

    /// Uniform real in `[0, 1)`.
    fn uniform_unit(&mut self) -> f64;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn uniform_int(&mut self, min: u32, max_exclusive: u32) -> u32 {
        assert!(
            min < max_exclusive,
            "uniform_int: empty range [{}, {})",
            min,
            max_exclusive
        );
        let range = max_exclusive - min;
        // Only draws below the largest multiple of `range` are accepted, so
        // every bucket holds the same number of raw values.
        let buckets = u32::MAX / range;
        let limit = buckets * range;
        loop {
            let raw = self.next_u32();
            if raw < limit {
                return min + raw / buckets;
            }
        }
    }

    fn uniform_unit(&mut self) -> f64 {
        // Top 53 bits scaled by 2^-53 stays strictly below 1.0.
        let raw = self.next_u64();
        (raw >> 11) as f64 * 2.0_f64.powi(-53)
    }
}
