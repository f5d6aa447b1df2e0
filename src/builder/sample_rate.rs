// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{ErrorKind, MetricError};
use std::convert::TryFrom;
use std::fmt;

/// Represents the sample rate of a metric. This is used to determine how often
/// a metric should be sent to the the statsd server. The sample rate is a value
/// greater than 0.0 and at most 1.0. Rates above 1.0 are clamped to 1.0.
///
/// A rate of 1.0 means that metrics are always sent and are never annotated
/// with a rate. Any smaller rate means that the call is sent with
/// that probability and each line is suffixed with `|@rate` so that the server
/// can scale the sampled values back up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate {
    value: f64,
}

impl SampleRate {
    /// Sample rate that sends every metric, unannotated.
    pub const ALWAYS: SampleRate = SampleRate { value: 1.0 };

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns true if metrics at this rate are subject to sampling and must
    /// carry the rate in their wire format.
    pub fn is_sampled(&self) -> bool {
        self.value < 1.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        SampleRate::ALWAYS
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = MetricError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        if rate.is_nan() || rate <= 0.0 {
            Err(MetricError::from((
                ErrorKind::InvalidInput,
                "Sample rate must be greater than 0.0",
            )))
        } else if rate >= 1.0 {
            Ok(SampleRate::ALWAYS)
        } else {
            Ok(SampleRate { value: rate })
        }
    }
}

// Shortest decimal that round-trips the rate, never in exponent form.
impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::SampleRate;
    use crate::types::ErrorKind;
    use std::convert::TryFrom;

    #[test]
    fn test_sample_rate_full_is_not_sampled() {
        let rate = SampleRate::try_from(1.0).unwrap();
        assert!(!rate.is_sampled());
        assert_eq!(SampleRate::ALWAYS, rate);
    }

    #[test]
    fn test_sample_rate_partial_is_sampled() {
        let rate = SampleRate::try_from(0.25).unwrap();
        assert!(rate.is_sampled());
        assert_eq!(0.25, rate.value());
    }

    #[test]
    fn test_sample_rate_display() {
        assert_eq!("0.5", SampleRate::try_from(0.5).unwrap().to_string());
        assert_eq!("0.1", SampleRate::try_from(0.1).unwrap().to_string());
        assert_eq!("0.0001", SampleRate::try_from(0.0001).unwrap().to_string());
        assert_eq!("1", SampleRate::ALWAYS.to_string());
    }

    #[test]
    fn test_sample_rate_above_one_is_always() {
        for rate in [1.01, 1.5, 2.0, f64::INFINITY] {
            let rate = SampleRate::try_from(rate).unwrap();
            assert_eq!(SampleRate::ALWAYS, rate);
            assert!(!rate.is_sampled());
        }
    }

    #[test]
    fn test_sample_rate_rejects_out_of_range() {
        for rate in [0.0, -0.5, f64::NAN, f64::NEG_INFINITY] {
            let err = SampleRate::try_from(rate).unwrap_err();
            assert_eq!(ErrorKind::InvalidInput, err.kind(), "rate was: {}", rate);
        }
    }
}
