// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::sample_rate::SampleRate;
use rand::Rng;

/// Source of the random draws used to decide whether a sampled call is sent.
///
/// A single value is drawn per client call (not per metric) so that every
/// metric in a batch is either sent or skipped together.
///
/// Implementations must be cheap: `draw` is called on the hot path of every
/// sampled metric call.
pub trait Sampler {
    /// Draw a uniformly distributed value in `[0, 1)`
    fn draw(&self) -> f64;

    /// Decide whether a call at the given rate should be sent.
    ///
    /// Calls at a rate of 1.0 are always sent without drawing a value.
    fn accepts(&self, rate: &SampleRate) -> bool {
        if !rate.is_sampled() {
            return true;
        }

        self.draw() <= rate.value()
    }
}

/// `Sampler` backed by the thread-local generator from `rand`.
///
/// This is the sampler used by clients unless another one is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct RngSampler;

impl Sampler for RngSampler {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// `Sampler` that always draws the same value.
///
/// Useful for tests or to force a particular sampling decision: a draw of
/// `0.0` sends every sampled call and a draw of `1.0` (or anything above the
/// configured rate) skips them.
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler {
    draw: f64,
}

impl FixedSampler {
    pub fn new(draw: f64) -> Self {
        FixedSampler { draw }
    }
}

impl Sampler for FixedSampler {
    fn draw(&self) -> f64 {
        self.draw
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedSampler, RngSampler, Sampler};
    use crate::builder::sample_rate::SampleRate;
    use std::cell::Cell;
    use std::convert::TryFrom;

    struct CountingSampler {
        draws: Cell<u32>,
    }

    impl Sampler for CountingSampler {
        fn draw(&self) -> f64 {
            self.draws.set(self.draws.get() + 1);
            0.99
        }
    }

    #[test]
    fn test_rng_sampler_draw_in_range() {
        let sampler = RngSampler;
        for _ in 0..1000 {
            let v = sampler.draw();
            assert!((0.0..1.0).contains(&v), "draw was: {}", v);
        }
    }

    #[test]
    fn test_full_rate_never_draws() {
        let sampler = CountingSampler { draws: Cell::new(0) };
        assert!(sampler.accepts(&SampleRate::ALWAYS));
        assert_eq!(0, sampler.draws.get());
    }

    #[test]
    fn test_draw_equal_to_rate_is_accepted() {
        let rate = SampleRate::try_from(0.5).unwrap();
        assert!(FixedSampler::new(0.5).accepts(&rate));
    }

    #[test]
    fn test_draw_above_rate_is_rejected() {
        let rate = SampleRate::try_from(0.5).unwrap();
        assert!(!FixedSampler::new(0.500001).accepts(&rate));
    }

    #[test]
    fn test_draw_below_rate_is_accepted() {
        let rate = SampleRate::try_from(0.1).unwrap();
        assert!(FixedSampler::new(0.0).accepts(&rate));
    }
}
