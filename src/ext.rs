// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2018-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Extension points for the Tally library
//!
//! Libraries wishing to make use of Tally for sending metrics to a Statsd
//! server but needing more control over how the metrics are built, encoded,
//! and sampled can make use of these extension points.

pub use crate::builder::{apply_sample_suffix, encode_counter, encode_timer, MetricType, MetricValue, SampleRate, Sampler};
pub use crate::client::{MetricBackend, ToCounterValue, ToTimerValue};
