// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2018 Philip Jenvey <pjenvey@mozilla.com>
// Copyright 2018-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::client::{MetricBackend, StatsdClient};
use crate::types::{MetricError, MetricResult, Outcome};
use std::convert::TryFrom;
use std::fmt::{self, Write};

pub mod sample_rate;
pub mod sampler;

pub use self::sample_rate::SampleRate;
pub use self::sampler::{FixedSampler, RngSampler, Sampler};

/// Type of metric that knows how to display itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Timer,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricType::Counter => "c".fmt(f),
            MetricType::Timer => "ms".fmt(f),
        }
    }
}

/// Holder for primitive metric values that knows how to display itself
///
/// This enum is internal to how various types that are valid for each type
/// of metric (e.g. types for which `ToCounterValue` or `ToTimerValue` are
/// implemented) are formatted but is exposed for documentation purposes and
/// advanced use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    Signed(i64),
    Unsigned(u64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
        }
    }
}

/// Everything after the `:` of a metric line, excluding the sample rate
#[derive(Debug, Clone)]
enum Body<'a> {
    Typed(MetricValue, MetricType),
    Encoded(&'a str),
}

#[derive(Debug, Clone)]
pub(crate) struct MetricFormatter<'a> {
    prefix: &'a str,
    key: &'a str,
    body: Body<'a>,
    rate: SampleRate,
}

impl<'a> MetricFormatter<'a> {
    const RATE_PREFIX: &'static str = "|@";

    pub(crate) fn counter(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_body(prefix, key, Body::Typed(val, MetricType::Counter))
    }

    pub(crate) fn timer(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_body(prefix, key, Body::Typed(val, MetricType::Timer))
    }

    /// Formatter for a value that was already encoded by the caller, such
    /// as `5|c`.
    pub(crate) fn encoded(prefix: &'a str, key: &'a str, body: &'a str) -> Self {
        Self::from_body(prefix, key, Body::Encoded(body))
    }

    fn from_body(prefix: &'a str, key: &'a str, body: Body<'a>) -> Self {
        MetricFormatter {
            prefix,
            key,
            body,
            rate: SampleRate::ALWAYS,
        }
    }

    pub(crate) fn with_sample_rate(&mut self, rate: SampleRate) {
        self.rate = rate;
    }

    #[rustfmt::skip]
    fn size_hint(&self) -> usize {
        let body = match self.body {
            Body::Typed(..) => 20 /* value */ + 1 /* | */ + 2, /* type */
            Body::Encoded(body) => body.len(),
        };

        self.prefix.len() + self.key.len() + 1 /* : */ + body + 20 /* |@rate */
    }

    fn write_base_metric(&self, out: &mut String) {
        let _ = match self.body {
            Body::Typed(val, type_) => write!(out, "{}{}:{}|{}", self.prefix, self.key, val, type_),
            Body::Encoded(body) => write!(out, "{}{}:{}", self.prefix, self.key, body),
        };
    }

    fn write_sample_rate(&self, out: &mut String) {
        if self.rate.is_sampled() {
            out.push_str(Self::RATE_PREFIX);
            let _ = write!(out, "{}", self.rate);
        }
    }

    pub(crate) fn format(&self) -> String {
        let mut metric_string = String::with_capacity(self.size_hint());
        self.write_base_metric(&mut metric_string);
        self.write_sample_rate(&mut metric_string);
        metric_string
    }
}

/// Encode a counter update as a Statsd line, e.g. `some.key:5|c`
///
/// The key is written verbatim: no prefix is added and no validation is done.
///
/// # Example
///
/// ```
/// use tally::ext::encode_counter;
///
/// assert_eq!("site.logins:-1|c", encode_counter("site.logins", -1));
/// ```
pub fn encode_counter(key: &str, delta: i64) -> String {
    MetricFormatter::counter("", key, MetricValue::Signed(delta)).format()
}

/// Encode a timing in milliseconds as a Statsd line, e.g. `some.key:42|ms`
///
/// # Example
///
/// ```
/// use tally::ext::encode_timer;
///
/// assert_eq!("db.query:42|ms", encode_timer("db.query", 42));
/// ```
pub fn encode_timer(key: &str, millis: u64) -> String {
    MetricFormatter::timer("", key, MetricValue::Unsigned(millis)).format()
}

/// Append the sample rate annotation to an encoded line.
///
/// The line is returned unchanged when the rate is 1.0 since unsampled
/// metrics do not carry a rate.
///
/// # Example
///
/// ```
/// use std::convert::TryFrom;
/// use tally::ext::{apply_sample_suffix, SampleRate};
///
/// let rate = SampleRate::try_from(0.5).unwrap();
/// assert_eq!("some.key:3|c|@0.5", apply_sample_suffix("some.key:3|c", rate));
/// assert_eq!("some.key:3|c", apply_sample_suffix("some.key:3|c", SampleRate::ALWAYS));
/// ```
pub fn apply_sample_suffix(line: &str, rate: SampleRate) -> String {
    if rate.is_sampled() {
        format!("{}{}{}", line, MetricFormatter::RATE_PREFIX, rate)
    } else {
        line.to_string()
    }
}

/// Internal state of a `MetricBuilder`
///
/// The builder can either be in the process of formatting metrics to send
/// via a client or it can be simply holding on to an error that it will be
/// dealt with when `.try_send()` or `.send()` is finally invoked.
#[derive(Debug)]
enum BuilderRepr<'m, 'c> {
    Success(Vec<MetricFormatter<'m>>, &'c StatsdClient),
    Error(MetricError, &'c StatsdClient),
}

/// Builder for setting the sample rate of in-progress metrics.
///
/// This builder holds one or more metrics that were previously constructed
/// by a call to a method on `StatsdClient`. The metrics are sampled and sent
/// via the client when `MetricBuilder::send()` or `MetricBuilder::try_send()`
/// is invoked. Any errors encountered constructing or validating the metrics
/// are returned (or handed to the error handler) when those methods are
/// finally invoked.
///
/// The sample rate defaults to 1.0, meaning the metrics are always sent.
///
/// NOTE: The only way to instantiate an instance of this builder is via methods
/// in the `StatsdClient` client.
///
/// # Examples
///
/// ## `.try_send()`
///
/// ```
/// use tally::prelude::*;
/// use tally::{StatsdClient, NopMetricSink, Outcome};
///
/// let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
/// let res = client.update_stats_builder(["logins", "visits"], 2).try_send();
///
/// assert_eq!(
///     Outcome::Delivered(vec![
///         "some.prefix.logins:2|c".to_string(),
///         "some.prefix.visits:2|c".to_string(),
///     ]),
///     res.unwrap(),
/// );
/// ```
///
/// ## `.send()`
///
/// ```
/// use tally::prelude::*;
/// use tally::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::builder("some.prefix", NopMetricSink)
///     .with_error_handler(|e| eprintln!("metric error: {}", e))
///     .build();
///
/// client.timing_builder("some.method", 38)
///     .with_sample_rate(0.1)
///     .send();
/// ```
///
/// Note that nothing is returned from the `.send()` method. Any errors encountered
/// in this case will be passed to the error handler we registered.
#[must_use = "Did you forget to call .send() after setting the sample rate?"]
#[derive(Debug)]
pub struct MetricBuilder<'m, 'c> {
    repr: BuilderRepr<'m, 'c>,
    rate: f64,
}

impl<'m, 'c> MetricBuilder<'m, 'c> {
    pub(crate) fn from_fmts(formatters: Vec<MetricFormatter<'m>>, client: &'c StatsdClient) -> Self {
        MetricBuilder {
            repr: BuilderRepr::Success(formatters, client),
            rate: 1.0,
        }
    }

    pub(crate) fn from_error(err: MetricError, client: &'c StatsdClient) -> Self {
        MetricBuilder {
            repr: BuilderRepr::Error(err, client),
            rate: 1.0,
        }
    }

    /// Set the sample rate for the metrics in this builder.
    ///
    /// The rate must be greater than 0.0. Rates of 1.0 or more skip sampling
    /// and send every metric without a rate suffix. Invalid rates are reported
    /// when the metrics are sent.
    ///
    /// # Example
    ///
    /// ```
    /// use tally::prelude::*;
    /// use tally::{StatsdClient, NopMetricSink, FixedSampler, Outcome};
    ///
    /// let client = StatsdClient::builder("", NopMetricSink)
    ///     .with_sampler(FixedSampler::new(0.0))
    ///     .build();
    /// let res = client.timing_builder("some.method", 12)
    ///     .with_sample_rate(0.25)
    ///     .try_send();
    ///
    /// assert_eq!(
    ///     Outcome::Delivered(vec!["some.method:12|ms|@0.25".to_string()]),
    ///     res.unwrap(),
    /// );
    /// ```
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sample and send the metrics using the client that created this builder.
    ///
    /// An `Err` is only returned for invalid input (a sample rate that is not
    /// greater than 0.0, a value that can't be represented). Failures
    /// writing to the sink are never returned as errors, they are reported
    /// via the `Outcome` instead.
    ///
    /// Note that the builder is consumed by this method and thus `.try_send()`
    /// can only be called a single time per builder.
    pub fn try_send(self) -> MetricResult<Outcome> {
        match self.repr {
            BuilderRepr::Error(err, _) => Err(err),
            BuilderRepr::Success(formatters, client) => {
                let rate = SampleRate::try_from(self.rate)?;
                Ok(client.dispatch(formatters, rate))
            }
        }
    }

    /// Sample and send the metrics using the client that created this builder,
    /// discarding the outcome and invoking a custom handler for error results.
    ///
    /// By default, if no handler is given, a "no-op" handler is used that
    /// simply discards all errors. If this isn't desired, a custom handler
    /// should be supplied when creating a new `StatsdClient` instance.
    ///
    /// Note that the builder is consumed by this method and thus `.send()`
    /// can only be called a single time per builder.
    pub fn send(self) {
        let client = match self.repr {
            BuilderRepr::Error(_, client) => client,
            BuilderRepr::Success(_, client) => client,
        };

        if let Err(e) = self.try_send() {
            client.consume_error(e);
        }
    }
}
