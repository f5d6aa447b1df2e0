// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of Tally for easy glob imports
//!
//! # Example
//!
//! ```
//! use tally::prelude::*;
//! use tally::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
//!
//! client.update_stats("some.counter", 1).unwrap();
//! client.increment(["some.counter", "other.counter"]).unwrap();
//! client.decrement("some.counter").unwrap();
//! client.timing("some.timer", 23).unwrap();
//! ```

pub use crate::client::{Counted, CountedExt, MetricClient, Timed};
