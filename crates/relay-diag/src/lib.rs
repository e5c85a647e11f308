//! Per-element execution-time sampling for the engine's diagnostics surface.
//!
//! When the `record` feature is **off**, `ElementTimers` is a zero-sized type
//! and every method is an `#[inline(always)]` no-op. When `record` is on,
//! each element slot gets a small ring of recent sample durations so
//! `Engine::get_info` can report a smoothed per-element CPU percentage.

/// Number of most-recent per-element update durations retained when `record`
/// is enabled. Chosen small enough that `get_info` always reflects a recent
/// window rather than a lifetime average.
pub const SAMPLE_WINDOW: usize = 64;

#[cfg(feature = "record")]
mod inner {
    use super::SAMPLE_WINDOW;

    #[derive(Clone)]
    struct Ring {
        samples: [u64; SAMPLE_WINDOW],
        write: usize,
        filled: usize,
    }

    impl Ring {
        fn new() -> Self {
            Self { samples: [0; SAMPLE_WINDOW], write: 0, filled: 0 }
        }

        fn push(&mut self, ns: u64) {
            self.samples[self.write] = ns;
            self.write = (self.write + 1) % SAMPLE_WINDOW;
            self.filled = (self.filled + 1).min(SAMPLE_WINDOW);
        }

        fn mean_ns(&self) -> u64 {
            if self.filled == 0 {
                return 0;
            }
            let sum: u64 = self.samples[..self.filled].iter().sum();
            sum / self.filled as u64
        }
    }

    /// Per-element execution-time samples, one ring per registered element.
    pub struct ElementTimers {
        rings: Vec<Ring>,
        pending: u64,
    }

    impl ElementTimers {
        pub fn new(element_count: usize) -> Self {
            Self { rings: (0..element_count).map(|_| Ring::new()).collect(), pending: 0 }
        }

        pub fn add_slot(&mut self) {
            self.rings.push(Ring::new());
        }

        #[inline(always)]
        pub fn begin(&mut self) {
            self.pending = relay_time::Time::monotonic_now_ns();
        }

        #[inline(always)]
        pub fn end(&mut self, index: usize) {
            let elapsed = relay_time::Time::monotonic_now_ns().saturating_sub(self.pending);
            if let Some(ring) = self.rings.get_mut(index) {
                ring.push(elapsed);
            }
        }

        pub fn mean_ns(&self, index: usize) -> u64 {
            self.rings.get(index).map(Ring::mean_ns).unwrap_or(0)
        }
    }
}

#[cfg(not(feature = "record"))]
mod inner {
    pub struct ElementTimers;

    impl ElementTimers {
        #[inline(always)]
        pub fn new(_element_count: usize) -> Self {
            Self
        }
        #[inline(always)]
        pub fn add_slot(&mut self) {}
        #[inline(always)]
        pub fn begin(&mut self) {}
        #[inline(always)]
        pub fn end(&mut self, _index: usize) {}
        #[inline(always)]
        pub fn mean_ns(&self, _index: usize) -> u64 {
            0
        }
    }
}

pub use inner::ElementTimers;

/// Converts a ratio `num/den` into a fixed-point `(integer_part, milli_fractional_part)`
/// pair so the diagnostics printer never has to format a float, mirroring the
/// engine's own `get_info` percentage formatting.
pub fn convert_floating_point(num: u64, den: u64) -> (u32, u32) {
    if den == 0 {
        return (0, 0);
    }
    let scaled = (num as u128 * 100_000) / den as u128;
    ((scaled / 1000) as u32, (scaled % 1000) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_floating_point_splits_integer_and_milli() {
        // 1/3 -> 33.333%
        let (whole, milli) = convert_floating_point(1, 3);
        assert_eq!(whole, 33);
        assert_eq!(milli, 333);
    }

    #[test]
    fn convert_floating_point_handles_zero_denominator() {
        assert_eq!(convert_floating_point(5, 0), (0, 0));
    }
}
