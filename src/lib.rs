// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A best-effort Statsd client for Rust!
//!
//! Tally sends counters and timings to a Statsd server over UDP, with
//! optional client side sampling. Sending metrics never blocks the caller
//! and failing to send a metric never interrupts it.
//!
//! ## Features
//!
//! * Support for emitting counters and timers to Statsd over UDP.
//! * Sampling of calls at a given rate, where every metric of a call is
//!   either sent (annotated with the rate) or skipped together.
//! * Sending the same counter update to a list of keys in a single call.
//! * An explicit result for each call: delivered, sampled out, or partially
//!   failed to transmit.
//! * Support for alternate backends via the `MetricSink` trait.
//!
//! ## Install
//!
//! To make use of `tally` in your project, add it as a dependency in your `Cargo.toml` file.
//!
//! ```toml
//! [dependencies]
//! tally = "x.y.z"
//! ```
//!
//! ## Usage
//!
//! ### Simple Use
//!
//! Create a client from a configuration and send a few metrics. The
//! configuration defaults to a server at `localhost:8125`.
//!
//! ```rust,no_run
//! use tally::prelude::*;
//! use tally::{StatsdClient, StatsdConfig};
//!
//! let config = StatsdConfig::default()
//!     .with_host("metrics.example.com")
//!     .with_prefix("my.metrics");
//!
//! // Failing to resolve the host or bind a socket is an error here but
//! // sending metrics afterwards never is.
//! let client = StatsdClient::from_config(&config).unwrap();
//!
//! client.increment("some.counter").unwrap();
//! client.decrement(["some.counter", "other.counter"]).unwrap();
//! client.update_stats("some.value", 5).unwrap();
//! client.timing("some.methodCall", 42).unwrap();
//! ```
//!
//! ### Sampling
//!
//! Every operation has a `_with_rate` variant. At a rate of 0.1, about one
//! call in ten is sent and the Statsd server scales the values back up.
//!
//! ```rust
//! use tally::prelude::*;
//! use tally::{StatsdClient, NopMetricSink, Outcome};
//!
//! let client = StatsdClient::from_sink("my.metrics", NopMetricSink);
//!
//! match client.increment_with_rate(["hits", "misses"], 0.1).unwrap() {
//!     Outcome::Delivered(lines) => assert_eq!(lines, vec![
//!         "my.metrics.hits:1|c|@0.1".to_string(),
//!         "my.metrics.misses:1|c|@0.1".to_string(),
//!     ]),
//!     outcome => assert!(outcome.is_sampled_out()),
//! }
//! ```
//!
//! ### Checking Delivery
//!
//! Write failures are collected rather than returned as errors. The
//! `Outcome` of a call lists what was sent and what wasn't, and the error
//! handler of the client is invoked for each failure.
//!
//! ```rust
//! use tally::prelude::*;
//! use tally::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::builder("my.metrics", NopMetricSink)
//!     .with_error_handler(|e| eprintln!("Failed to send metric: {}", e))
//!     .build();
//!
//! let outcome = client.timing("db.query", 12).unwrap();
//! assert!(outcome.is_success());
//! ```
//!
//! ### Custom Metric Sinks
//!
//! The `StatsdClient` uses implementations of the `MetricSink` trait to
//! send metrics to a metric server. Most users will want to use the
//! `UdpMetricSink`, but custom sinks can be used as well.
//!
//! ```rust
//! use std::io;
//! use tally::prelude::*;
//! use tally::{StatsdClient, MetricSink};
//!
//! pub struct MyMetricSink;
//!
//! impl MetricSink for MyMetricSink {
//!     fn emit(&self, metric: &str) -> io::Result<usize> {
//!         // Your custom metric sink implementation goes here!
//!         Ok(0)
//!     }
//! }
//!
//! let sink = MyMetricSink;
//! let client = StatsdClient::from_sink("my.prefix", sink);
//!
//! client.update_stats("my.counter.thing", 42).unwrap();
//! client.timing("my.method.time", 25).unwrap();
//! ```
//!
//! ### Logging
//!
//! Tally logs each metric written at the `trace` level and each metric that
//! was dropped or sampled out at the `debug` level using the `log` crate. No
//! logger is installed by the library.

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub const DEFAULT_PORT: u16 = 8125;

pub use self::builder::{FixedSampler, MetricBuilder, RngSampler};

pub use self::client::{Counted, CountedExt, MetricClient, StatsdClient, StatsdClientBuilder, Timed};

pub use self::config::{StatsdConfig, DEFAULT_HOST};

pub use self::sinks::{MetricSink, NopMetricSink, SinkStats, SpyMetricSink, UdpMetricSink};

pub use self::types::{ErrorKind, Keys, MetricError, MetricResult, Outcome};

mod builder;
mod client;
mod config;
pub mod ext;
pub mod prelude;
mod sinks;
mod types;


mod sealed {
    pub trait Sealed {}
}
