// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;
use std::slice;

/// One or more metric keys that share the same value and sample rate.
///
/// Counter operations accept anything that converts into `Keys`: a single
/// key or a list of keys. Each key becomes its own datagram but all of them
/// share a single sampling decision, meaning that either every key in the
/// batch is sent or none of them are. An empty list sends nothing and is
/// reported as delivered, the same as a raw send with no entries.
///
/// Mappings of keys to values are not a valid batch and do not convert into
/// `Keys`, so passing one is rejected by the compiler.
///
/// ```compile_fail
/// use std::collections::HashMap;
/// use tally::prelude::*;
/// use tally::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::from_sink("", NopMetricSink);
/// let mut keyed = HashMap::new();
/// keyed.insert("some.counter", 1);
///
/// client.update_stats(keyed, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keys<'a> {
    Single(&'a str),
    List(Vec<&'a str>),
}

impl<'a> Keys<'a> {
    /// Number of keys in this batch
    pub fn len(&self) -> usize {
        match self {
            Keys::Single(_) => 1,
            Keys::List(keys) => keys.len(),
        }
    }

    /// Returns true if this batch has no keys at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over each key in this batch, in order
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        let keys: &[&'a str] = match self {
            Keys::Single(key) => slice::from_ref(key),
            Keys::List(keys) => keys.as_slice(),
        };

        keys.iter().copied()
    }
}

impl<'a> From<&'a str> for Keys<'a> {
    fn from(key: &'a str) -> Self {
        Keys::Single(key)
    }
}

impl<'a> From<&'a String> for Keys<'a> {
    fn from(key: &'a String) -> Self {
        Keys::Single(key.as_str())
    }
}

impl<'a> From<Vec<&'a str>> for Keys<'a> {
    fn from(keys: Vec<&'a str>) -> Self {
        Keys::List(keys)
    }
}

impl<'a> From<&'a [&'a str]> for Keys<'a> {
    fn from(keys: &'a [&'a str]) -> Self {
        Keys::List(keys.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Keys<'a> {
    fn from(keys: [&'a str; N]) -> Self {
        Keys::List(keys.to_vec())
    }
}

impl<'a> From<&'a [String]> for Keys<'a> {
    fn from(keys: &'a [String]) -> Self {
        Keys::List(keys.iter().map(String::as_str).collect())
    }
}

impl<'a> From<&'a Vec<String>> for Keys<'a> {
    fn from(keys: &'a Vec<String>) -> Self {
        Keys::from(keys.as_slice())
    }
}

/// What happened to the metrics of a single call once they reached the
/// sampler.
///
/// Statsd is a fire-and-forget protocol and failing to write a datagram is
/// not treated as an error. Instead, callers that care can inspect this
/// value to find out whether everything was written, whether sampling
/// skipped the call entirely, or whether some datagrams were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every line was written to the sink.
    Delivered(Vec<String>),
    /// The call lost the sampling draw and nothing was written.
    SampledOut,
    /// At least one line could not be written. Lines after a failure are
    /// still attempted.
    TransmitFailed { sent: Vec<String>, failed: Vec<String> },
}

impl Outcome {
    pub(crate) fn from_results(sent: Vec<String>, failed: Vec<String>) -> Self {
        if failed.is_empty() {
            Outcome::Delivered(sent)
        } else {
            Outcome::TransmitFailed { sent, failed }
        }
    }

    /// Returns false only when one or more lines failed to be written.
    ///
    /// Being sampled out counts as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::TransmitFailed { .. })
    }

    /// Returns true if sampling suppressed the call
    pub fn is_sampled_out(&self) -> bool {
        matches!(self, Outcome::SampledOut)
    }

    /// Lines that were written to the sink successfully
    pub fn sent(&self) -> &[String] {
        match self {
            Outcome::Delivered(sent) => sent,
            Outcome::TransmitFailed { sent, .. } => sent,
            Outcome::SampledOut => &[],
        }
    }

    /// Lines that the sink failed to write
    pub fn failed(&self) -> &[String] {
        match self {
            Outcome::TransmitFailed { failed, .. } => failed,
            _ => &[],
        }
    }
}

/// Potential categories an error from this library falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    InvalidInput,
    IoError,
}

/// Error generated by this library
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    IoError(io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(_) => ErrorKind::IoError,
            ErrorRepr::WithDescription(kind, _) => kind,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::{ErrorKind, Keys, MetricError, Outcome};
    use std::error::Error;
    use std::io;

    #[test]
    fn test_keys_from_single() {
        let keys = Keys::from("some.counter");
        assert_eq!(Keys::Single("some.counter"), keys);
        assert_eq!(vec!["some.counter"], keys.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_keys_from_array_keeps_order() {
        let keys = Keys::from(["b", "a", "c"]);
        assert_eq!(3, keys.len());
        assert_eq!(vec!["b", "a", "c"], keys.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_keys_from_owned_strings() {
        let owned = vec!["site.logins".to_string(), "site.visits".to_string()];
        let keys = Keys::from(&owned);
        assert_eq!(Keys::List(vec!["site.logins", "site.visits"]), keys);
    }

    #[test]
    fn test_keys_empty_list() {
        let keys = Keys::from(Vec::<&str>::new());
        assert!(keys.is_empty());
        assert_eq!(0, keys.iter().count());
    }

    #[test]
    fn test_outcome_delivered_is_success() {
        let outcome = Outcome::from_results(vec!["a:1|c".to_string()], Vec::new());
        assert!(outcome.is_success());
        assert!(!outcome.is_sampled_out());
        assert_eq!(&["a:1|c".to_string()], outcome.sent());
        assert!(outcome.failed().is_empty());
    }

    #[test]
    fn test_outcome_sampled_out_is_success() {
        let outcome = Outcome::SampledOut;
        assert!(outcome.is_success());
        assert!(outcome.is_sampled_out());
        assert!(outcome.sent().is_empty());
    }

    #[test]
    fn test_outcome_any_failure_is_not_success() {
        let outcome = Outcome::from_results(vec!["a:1|c".to_string()], vec!["b:1|c".to_string()]);
        assert!(!outcome.is_success());
        assert_eq!(&["b:1|c".to_string()], outcome.failed());
    }

    #[test]
    fn test_metric_error_from_description() {
        let err = MetricError::from((ErrorKind::InvalidInput, "Sample rate must be between 0.0 and 1.0"));
        assert_eq!(ErrorKind::InvalidInput, err.kind());
        assert_eq!("Sample rate must be between 0.0 and 1.0", err.to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_metric_error_from_io_error() {
        let err = MetricError::from(io::Error::new(io::ErrorKind::Other, "connection refused"));
        assert_eq!(ErrorKind::IoError, err.kind());
        assert!(err.source().is_some());
    }
}
