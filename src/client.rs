// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::builder::{MetricBuilder, MetricFormatter, MetricValue, RngSampler, SampleRate, Sampler};
use crate::config::StatsdConfig;
use crate::sealed::Sealed;
use crate::sinks::{MetricSink, SinkStats, UdpMetricSink};
use crate::types::{ErrorKind, Keys, MetricError, MetricResult, Outcome};
use std::convert::TryFrom;
use std::fmt;
use std::panic::RefUnwindSafe;
use std::time::Duration;

/// Conversion trait for valid values for counters
///
/// This trait must be implemented for any types that are used as counter
/// values (currently only `i64`). This trait is internal to how values are
/// formatted as part of metrics but is exposed publicly for documentation
/// purposes.
///
/// Typical use of Tally shouldn't require interacting with this trait.
pub trait ToCounterValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToCounterValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

/// Conversion trait for valid values for timers
///
/// This trait must be implemented for any types that are used as timer
/// values (currently `u64` and `Duration`). This trait is internal to how
/// values are formatted as part of metrics but is exposed publicly for
/// documentation purposes.
///
/// Typical use of Tally shouldn't require interacting with this trait.
pub trait ToTimerValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToTimerValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToTimerValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        let as_millis = self.as_millis();
        if as_millis > u64::MAX as u128 {
            Err(MetricError::from((ErrorKind::InvalidInput, "u64 overflow")))
        } else {
            Ok(MetricValue::Unsigned(as_millis as u64))
        }
    }
}

/// Trait for incrementing and decrementing counters.
///
/// Counters are simple values incremented or decremented by a client. The
/// rates at which these events occur or average values will be determined
/// by the server receiving them. Examples of counter uses include number
/// of logins to a system or requests received.
///
/// Every method accepts either a single key or a list of keys (anything that
/// converts into `Keys`). Each key in a list is sent as its own metric with
/// the same value, and the whole list is sampled together: either every key
/// is sent or none of them are.
///
/// The following types are valid for counters:
/// * `i64`
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Counted<T>
where
    T: ToCounterValue,
{
    /// Increment or decrement each counter by the given amount
    fn update_stats<'a, K>(&'a self, keys: K, delta: T) -> MetricResult<Outcome>
    where
        K: Into<Keys<'a>>,
    {
        self.update_stats_builder(keys, delta).try_send()
    }

    /// Increment or decrement each counter by the given amount, only sending
    /// the metrics some fraction of the time.
    fn update_stats_with_rate<'a, K>(&'a self, keys: K, delta: T, rate: f64) -> MetricResult<Outcome>
    where
        K: Into<Keys<'a>>,
    {
        self.update_stats_builder(keys, delta).with_sample_rate(rate).try_send()
    }

    /// Increment or decrement each counter by the given amount and return
    /// a `MetricBuilder` that can be used to set the sample rate.
    fn update_stats_builder<'a, K>(&'a self, keys: K, delta: T) -> MetricBuilder<'a, 'a>
    where
        K: Into<Keys<'a>>;
}

/// Trait for convenience methods for counters
///
/// This trait specifically implements increment and decrement convenience
/// methods for counters with `i64` types.
pub trait CountedExt: Counted<i64> {
    /// Increment each counter by 1
    fn increment<'a, K>(&'a self, keys: K) -> MetricResult<Outcome>
    where
        K: Into<Keys<'a>>,
    {
        self.update_stats(keys, 1)
    }

    /// Increment each counter by 1, only sending the metrics some fraction
    /// of the time.
    fn increment_with_rate<'a, K>(&'a self, keys: K, rate: f64) -> MetricResult<Outcome>
    where
        K: Into<Keys<'a>>,
    {
        self.update_stats_with_rate(keys, 1, rate)
    }

    /// Decrement each counter by 1
    fn decrement<'a, K>(&'a self, keys: K) -> MetricResult<Outcome>
    where
        K: Into<Keys<'a>>,
    {
        self.update_stats(keys, -1)
    }

    /// Decrement each counter by 1, only sending the metrics some fraction
    /// of the time.
    fn decrement_with_rate<'a, K>(&'a self, keys: K, rate: f64) -> MetricResult<Outcome>
    where
        K: Into<Keys<'a>>,
    {
        self.update_stats_with_rate(keys, -1, rate)
    }
}

/// Trait for recording timings in milliseconds.
///
/// Timings are a positive number of milliseconds between a start and end
/// time. Examples include time taken to render a web page or time taken
/// for a database call to return. `Duration` values are converted to
/// milliseconds before being recorded.
///
/// The following types are valid for timers:
/// * `u64`
/// * `Duration`
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Timed<T>
where
    T: ToTimerValue,
{
    /// Record a timing in milliseconds with the given key
    fn timing(&self, key: &str, time: T) -> MetricResult<Outcome> {
        self.timing_builder(key, time).try_send()
    }

    /// Record a timing in milliseconds with the given key, only sending the
    /// metric some fraction of the time.
    fn timing_with_rate(&self, key: &str, time: T, rate: f64) -> MetricResult<Outcome> {
        self.timing_builder(key, time).with_sample_rate(rate).try_send()
    }

    /// Record a timing in milliseconds with the given key and return a
    /// `MetricBuilder` that can be used to set the sample rate.
    fn timing_builder<'a>(&'a self, key: &'a str, time: T) -> MetricBuilder<'a, 'a>;
}

/// Trait that encompasses all other traits for sending metrics.
///
/// If you wish to use `StatsdClient` with a generic type or place a
/// `StatsdClient` instance behind a pointer (such as an `Arc`) this
/// trait allows you to refer to all the methods for recording metrics
/// with a single bound.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tally::prelude::*;
/// use tally::{StatsdClient, NopMetricSink};
///
/// fn record_login<C: MetricClient>(metrics: &C, elapsed: Duration) {
///     metrics.increment("auth.logins").unwrap();
///     metrics.timing("auth.login_time", elapsed).unwrap();
/// }
///
/// let client = Arc::new(StatsdClient::from_sink("my.prefix", NopMetricSink));
///
/// record_login(client.as_ref(), Duration::from_millis(12));
/// client.update_stats(["some.counter", "other.counter"], 3).unwrap();
/// client.decrement("some.counter").unwrap();
/// client.timing("some.timer", 42).unwrap();
/// ```
pub trait MetricClient: Counted<i64> + CountedExt + Timed<u64> + Timed<Duration> {}

impl<T> MetricClient for T where T: Counted<i64> + CountedExt + Timed<u64> + Timed<Duration> {}

/// Typically internal client methods for sending metrics and handling errors.
///
/// This trait exposes methods of the client that would normally be internal
/// but may be useful for consumers of the library to extend it in unforeseen
/// ways. Most consumers of the library shouldn't need to make use of this
/// extension point.
///
/// This trait is not exposed in the `prelude` module since it isn't required
/// to use the client for sending metrics. It is only exposed in the `ext`
/// module which is used to encompass advanced extension points for the library.
///
/// NOTE: This is a sealed trait and so it cannot be implemented outside of the
/// library.
///
/// # Example
///
/// ```
/// use tally::{Outcome, StatsdClient, NopMetricSink};
/// use tally::ext::MetricBackend;
///
/// let client = StatsdClient::from_sink("my.prefix", NopMetricSink);
///
/// // Values are already encoded, only the prefix and sample rate are added
/// let res = client.send(vec![("some.counter", "5|c"), ("some.set", "3|s")], 1.0);
///
/// assert_eq!(
///     Outcome::Delivered(vec![
///         "my.prefix.some.counter:5|c".to_string(),
///         "my.prefix.some.set:3|s".to_string(),
///     ]),
///     res.unwrap(),
/// );
/// ```
pub trait MetricBackend: Sealed {
    /// Sample and send metrics whose values are already encoded.
    ///
    /// Each item is a key and the encoded value that follows the `:` in a
    /// metric line, such as `5|c`. The client prefix is added to every key
    /// and, when the rate is below 1.0, the sample rate is appended to every
    /// line. A single sampling decision is made for the whole set.
    ///
    /// Only an invalid sample rate results in an `Err`. Failures writing to
    /// the sink are reported via the returned `Outcome`.
    fn send<I, K, V>(&self, metrics: I, rate: f64) -> MetricResult<Outcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>;

    /// Send a fully formed metric line via the underlying `MetricSink`
    ///
    /// The line is sent verbatim: no prefix is added and no sampling is done.
    fn send_metric(&self, metric: &str) -> MetricResult<()>;

    /// Consume a possible error from attempting to send a metric.
    ///
    /// This method is invoked for every metric that could not be written to
    /// the sink and for every error encountered by the `MetricBuilder::send()`
    /// method. By default the handler is a no-op, meaning that errors are
    /// discarded.
    fn consume_error(&self, err: MetricError);
}

/// Builder for creating and customizing `StatsdClient` instances.
///
/// Instances of the builder should be created by calling the `::builder()`
/// method on the `StatsClient` struct.
///
/// # Example
///
/// ```
/// use tally::prelude::*;
/// use tally::{MetricError, StatsdClient, NopMetricSink, RngSampler};
///
/// fn my_error_handler(err: MetricError) {
///     println!("Metric error! {}", err);
/// }
///
/// let client = StatsdClient::builder("prefix", NopMetricSink)
///     .with_error_handler(my_error_handler)
///     .with_sampler(RngSampler)
///     .build();
///
/// client.update_stats("something", 123).unwrap();
/// client.update_stats_builder("some.counter", 42)
///     .with_sample_rate(0.5)
///     .send();
/// ```
pub struct StatsdClientBuilder {
    prefix: String,
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    sampler: Box<dyn Sampler + Sync + Send + RefUnwindSafe>,
}

impl StatsdClientBuilder {
    // Set the required fields and defaults for optional fields
    fn new<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder {
            // required
            prefix: Self::formatted_prefix(prefix),
            sink: Box::new(sink),

            // optional with defaults
            errors: Box::new(nop_error_handler),
            sampler: Box::new(RngSampler),
        }
    }

    /// Set an error handler to use for metrics that could not be sent
    ///
    /// The error handler is invoked for each metric that the sink failed to
    /// write and for invalid input encountered by `MetricBuilder::send()`.
    ///
    /// The error handler should consume the error without panicking. The error
    /// may be logged, printed to stderr, discarded, etc. - this is up to the
    /// implementation.
    pub fn with_error_handler<F>(mut self, errors: F) -> Self
    where
        F: Fn(MetricError) + Sync + Send + RefUnwindSafe + 'static,
    {
        self.errors = Box::new(errors);
        self
    }

    /// Set the source of random draws used to decide whether sampled metrics
    /// are sent.
    ///
    /// By default a `RngSampler` backed by a thread local random number
    /// generator is used. A `FixedSampler` makes sampling deterministic.
    pub fn with_sampler<S>(mut self, sampler: S) -> Self
    where
        S: Sampler + Sync + Send + RefUnwindSafe + 'static,
    {
        self.sampler = Box::new(sampler);
        self
    }

    /// Construct a new `StatsdClient` instance based on current settings.
    pub fn build(self) -> StatsdClient {
        StatsdClient::from_builder(self)
    }

    fn formatted_prefix(prefix: &str) -> String {
        if prefix.is_empty() {
            String::new()
        } else {
            format!("{}.", prefix.trim_end_matches('.'))
        }
    }
}

/// Client for Statsd that implements various traits to record metrics.
///
/// # Traits
///
/// The client is the main entry point for users of this library. It supports
/// several traits for recording metrics of different types.
///
/// * `Counted` for emitting counters.
/// * `CountedExt` for incrementing and decrementing counters by one.
/// * `Timed` for emitting timings.
/// * `MetricClient` for a combination of all of the above.
///
/// For more information about the uses for each type of metric, see the
/// documentation for each mentioned trait.
///
/// # Sampling
///
/// Every method has a variant that accepts a sample rate between 0.0 and 1.0.
/// A single random draw is made per call: if the draw is at most the rate,
/// every metric of the call is sent annotated with the rate, otherwise nothing
/// is sent at all.
///
/// # Delivery
///
/// Sending is best-effort. Failing to write a metric is never returned as an
/// error, it's reported via the `Outcome` of the call and passed to the error
/// handler. The remaining metrics of the call are still sent.
///
/// # Threading
///
/// The `StatsdClient` is designed to work in a multithreaded application. All
/// parts of the client can be shared between threads (i.e. it is `Send` and
/// `Sync`). Wrap it in an `Arc` to share it.
///
/// ``` no_run
/// use std::sync::Arc;
/// use std::thread;
/// use tally::prelude::*;
/// use tally::{StatsdClient, StatsdConfig};
///
/// let config = StatsdConfig::default().with_prefix("some.prefix");
/// let client = Arc::new(StatsdClient::from_config(&config).unwrap());
///
/// let metric_ref = client.clone();
/// let t = thread::spawn(move || {
///     metric_ref.increment("request.handler").unwrap();
/// });
///
/// t.join().unwrap();
/// ```
pub struct StatsdClient {
    prefix: String,
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    sampler: Box<dyn Sampler + Sync + Send + RefUnwindSafe>,
}

impl StatsdClient {
    /// Create a new client instance that will use the given prefix for
    /// all metrics emitted to the given `MetricSink` implementation.
    ///
    /// Note that this client will discard errors passed to its error
    /// handler.
    ///
    /// # No-op Example
    ///
    /// ```
    /// use tally::{StatsdClient, NopMetricSink};
    ///
    /// let prefix = "my.stats";
    /// let client = StatsdClient::from_sink(prefix, NopMetricSink);
    /// ```
    ///
    /// # UDP Socket Example
    ///
    /// ```
    /// use std::net::UdpSocket;
    /// use tally::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
    ///
    /// let prefix = "my.stats";
    /// let host = ("127.0.0.1", DEFAULT_PORT);
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// socket.set_nonblocking(true).unwrap();
    ///
    /// let sink = UdpMetricSink::from(host, socket).unwrap();
    /// let client = StatsdClient::from_sink(prefix, sink);
    /// ```
    pub fn from_sink<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder(prefix, sink).build()
    }

    /// Create a new client that sends metrics over UDP to the server and
    /// with the prefix described by the given configuration.
    ///
    /// A non-blocking UDP socket is bound to a random local port.
    ///
    /// # Example
    ///
    /// ```
    /// use tally::prelude::*;
    /// use tally::{StatsdClient, StatsdConfig};
    ///
    /// let config = StatsdConfig::new("127.0.0.1", 8125).with_prefix("my.stats");
    /// let client = StatsdClient::from_config(&config).unwrap();
    ///
    /// client.increment("some.counter").unwrap();
    /// ```
    ///
    /// # Failures
    ///
    /// This method fails if the host can't be resolved or a socket can't be
    /// bound. Nothing is sent in that case.
    pub fn from_config(config: &StatsdConfig) -> MetricResult<Self> {
        let sink = UdpMetricSink::bind(config.addr())?;
        Ok(Self::from_sink(config.prefix(), sink))
    }

    /// Create a new builder with the provided prefix and metric sink.
    ///
    /// A prefix and a metric sink are required to create a new client
    /// instance. All other optional customizations can be set by calling
    /// methods on the returned builder. Any customizations that aren't
    /// set by the caller will use defaults.
    ///
    /// Note, though a metric prefix is required, you may pass an empty
    /// string as a prefix. In this case, the metrics emitted will use only
    /// the bare keys supplied when you call the various methods to emit
    /// metrics.
    ///
    /// General defaults:
    ///
    /// * A no-op error handler will be used by default.
    /// * Sampling uses a thread local random number generator by default.
    ///
    /// # Example
    ///
    /// ```
    /// use tally::prelude::*;
    /// use tally::{StatsdClient, MetricError, NopMetricSink};
    ///
    /// fn my_handler(err: MetricError) {
    ///     println!("Metric error: {}", err);
    /// }
    ///
    /// let client = StatsdClient::builder("some.prefix", NopMetricSink)
    ///     .with_error_handler(my_handler)
    ///     .build();
    ///
    /// client.timing_builder("some.key", 7)
    ///    .with_sample_rate(0.25)
    ///    .send();
    /// ```
    pub fn builder<T>(prefix: &str, sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder::new(prefix, sink)
    }

    /// Flush the underlying metric sink.
    ///
    /// None of the sinks in this crate buffer metrics so this only has an
    /// effect for custom sinks that do.
    pub fn flush(&self) -> MetricResult<()> {
        Ok(self.sink.flush()?)
    }

    /// Return I/O telemetry of the underlying metric sink
    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }

    // Create a new StatsdClient by consuming the builder
    fn from_builder(builder: StatsdClientBuilder) -> Self {
        StatsdClient {
            prefix: builder.prefix,
            sink: builder.sink,
            errors: builder.errors,
            sampler: builder.sampler,
        }
    }

    /// Make a single sampling decision for all metrics and, if they survive,
    /// write each of them to the sink annotated with the sample rate.
    pub(crate) fn dispatch(&self, formatters: Vec<MetricFormatter<'_>>, rate: SampleRate) -> Outcome {
        if !self.sampler.accepts(&rate) {
            debug!("Sampled out {} metric(s) at rate {}", formatters.len(), rate);
            return Outcome::SampledOut;
        }

        let mut sent = Vec::with_capacity(formatters.len());
        let mut failed = Vec::new();

        for mut fmt in formatters {
            fmt.with_sample_rate(rate);
            let metric = fmt.format();

            match self.sink.emit(&metric) {
                Ok(_) => {
                    trace!("Sent metric {}", metric);
                    sent.push(metric);
                }
                Err(e) => {
                    debug!("Failed to send metric {}: {}", metric, e);
                    self.consume_error(MetricError::from(e));
                    failed.push(metric);
                }
            }
        }

        Outcome::from_results(sent, failed)
    }
}

impl Sealed for StatsdClient {}

impl MetricBackend for StatsdClient {
    fn send<I, K, V>(&self, metrics: I, rate: f64) -> MetricResult<Outcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let rate = SampleRate::try_from(rate)?;
        let metrics: Vec<(K, V)> = metrics.into_iter().collect();
        let formatters = metrics
            .iter()
            .map(|(key, value)| MetricFormatter::encoded(&self.prefix, key.as_ref(), value.as_ref()))
            .collect();

        Ok(self.dispatch(formatters, rate))
    }

    fn send_metric(&self, metric: &str) -> MetricResult<()> {
        self.sink.emit(metric)?;
        Ok(())
    }

    fn consume_error(&self, err: MetricError) {
        (self.errors)(err);
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ prefix: {:?}, sink: ..., errors: ..., sampler: ... }}",
            self.prefix,
        )
    }
}

impl<T> Counted<T> for StatsdClient
where
    T: ToCounterValue,
{
    fn update_stats_builder<'a, K>(&'a self, keys: K, delta: T) -> MetricBuilder<'a, 'a>
    where
        K: Into<Keys<'a>>,
    {
        let keys: Keys<'a> = keys.into();
        match delta.try_to_value() {
            Ok(v) => {
                let formatters = keys
                    .iter()
                    .map(|key| MetricFormatter::counter(&self.prefix, key, v))
                    .collect();
                MetricBuilder::from_fmts(formatters, self)
            }
            Err(e) => MetricBuilder::from_error(e, self),
        }
    }
}

impl CountedExt for StatsdClient {}

impl<T> Timed<T> for StatsdClient
where
    T: ToTimerValue,
{
    fn timing_builder<'a>(&'a self, key: &'a str, time: T) -> MetricBuilder<'a, 'a> {
        match time.try_to_value() {
            Ok(v) => MetricBuilder::from_fmts(vec![MetricFormatter::timer(&self.prefix, key, v)], self),
            Err(e) => MetricBuilder::from_error(e, self),
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn nop_error_handler(_err: MetricError) {
    // nothing
}
