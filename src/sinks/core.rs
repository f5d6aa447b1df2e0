// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts of datagrams (and their bytes) a sink delivered or dropped.
///
/// Bytes sent are what the transport reported as written. Bytes dropped are
/// the length of each line that failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub bytes_dropped: u64,
    pub packets_dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    bytes_sent: AtomicU64,
    packets_sent: AtomicU64,
    bytes_dropped: AtomicU64,
    packets_dropped: AtomicU64,
}

/// Shared, lock-free tally of every `emit` made by a sink. Clones share the
/// same counters.
#[derive(Debug, Clone, Default)]
pub(crate) struct SocketStats {
    counters: Arc<Counters>,
}

impl SocketStats {
    /// Count the result of writing one line of `len` bytes and hand the
    /// result back unchanged.
    pub(crate) fn record(&self, res: io::Result<usize>, len: usize) -> io::Result<usize> {
        let c = &self.counters;
        let (bytes, packets, n) = match &res {
            Ok(written) => (&c.bytes_sent, &c.packets_sent, *written),
            Err(_) => (&c.bytes_dropped, &c.packets_dropped, len),
        };

        bytes.fetch_add(n as u64, Ordering::Relaxed);
        packets.fetch_add(1, Ordering::Relaxed);
        res
    }
}

impl From<&SocketStats> for SinkStats {
    fn from(stats: &SocketStats) -> Self {
        let c = &stats.counters;
        SinkStats {
            bytes_sent: c.bytes_sent.load(Ordering::Relaxed),
            packets_sent: c.packets_sent.load(Ordering::Relaxed),
            bytes_dropped: c.bytes_dropped.load(Ordering::Relaxed),
            packets_dropped: c.packets_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Where the client writes its encoded lines.
///
/// `emit` receives one complete Statsd line with no trailing newline and
/// should turn it into exactly one datagram. The client only ever produces
/// these shapes:
///
/// ``` text
/// some.counter:123|c
/// some.timer:456|ms
/// some.counter:1|c|@0.1
/// ```
///
/// Implementations must not block indefinitely. A failed `emit` is recorded
/// in the call's `Outcome` and never retried, so there is no need for a sink
/// to retry internally either.
pub trait MetricSink {
    /// Write one line, returning the number of bytes the transport accepted.
    fn emit(&self, metric: &str) -> io::Result<usize>;

    /// Push out anything held back by the sink. Sinks that write each line
    /// immediately can rely on this default, which does nothing.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Counts of lines sent and dropped so far. All zeros unless the sink
    /// keeps track.
    fn stats(&self) -> SinkStats {
        SinkStats::default()
    }
}

/// Sink that accepts every line and writes nothing.
#[derive(Debug, Clone)]
pub struct NopMetricSink;

impl MetricSink for NopMetricSink {
    fn emit(&self, _metric: &str) -> io::Result<usize> {
        Ok(0)
    }
}
