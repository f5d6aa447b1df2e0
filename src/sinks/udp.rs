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
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use crate::sinks::core::{MetricSink, SinkStats, SocketStats};
use crate::types::{ErrorKind, MetricError, MetricResult};

/// Attempt to convert anything implementing the `ToSocketAddrs` trait
/// into a concrete `SocketAddr` instance, returning an `InvalidInput`
/// error if the address could not be parsed.
// Public portion of the API (the sink constructors) is pass by value so
// there's no point in changing this to be pass by reference yet.
#[allow(clippy::needless_pass_by_value)]
fn get_addr<A: ToSocketAddrs>(addr: A) -> MetricResult<SocketAddr> {
    match addr.to_socket_addrs()?.next() {
        Some(addr) => Ok(addr),
        None => Err(MetricError::from((
            ErrorKind::InvalidInput,
            "No socket addresses yielded",
        ))),
    }
}

/// Local wildcard address of the same family as the remote one
fn local_addr_for(remote: &SocketAddr) -> SocketAddr {
    match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    }
}

/// Implementation of a `MetricSink` that emits metrics over UDP.
///
/// It accepts a UDP socket instance over which to write metrics and the
/// address of the Statsd server to send packets to. Every metric is written
/// as its own datagram: there is no buffering or batching of metrics.
///
/// Each metric is sent to the Statsd server when the `.emit()` method is
/// called, in the thread of the caller. Nothing waits for an acknowledgement
/// since the protocol doesn't have any.
#[derive(Debug)]
pub struct UdpMetricSink {
    addr: SocketAddr,
    socket: UdpSocket,
    stats: SocketStats,
}

impl UdpMetricSink {
    /// Construct a new `UdpMetricSink` instance.
    ///
    /// The address should be the address of the remote metric server to
    /// emit metrics to over UDP. The socket should already be bound to a
    /// local address with any desired configuration applied (blocking vs
    /// non-blocking, timeouts, etc.).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::net::UdpSocket;
    /// use tally::{UdpMetricSink, DEFAULT_PORT};
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// socket.set_nonblocking(true).unwrap();
    /// let host = ("metrics.example.com", DEFAULT_PORT);
    /// let sink = UdpMetricSink::from(host, socket);
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * The host address is otherwise unable to be parsed
    pub fn from<A>(to_addr: A, socket: UdpSocket) -> MetricResult<UdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(to_addr)?;
        let stats = SocketStats::default();
        Ok(UdpMetricSink { addr, socket, stats })
    }

    /// Construct a new `UdpMetricSink` instance along with the socket it
    /// writes to.
    ///
    /// The address of the metric server is resolved and a socket is bound to
    /// the wildcard address of the same family (IPv4 or IPv6) on a random
    /// port. The socket is put into non-blocking mode so that emitting a
    /// metric never waits on the network.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tally::{UdpMetricSink, DEFAULT_PORT};
    ///
    /// let sink = UdpMetricSink::bind(("metrics.example.com", DEFAULT_PORT)).unwrap();
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * A local socket could not be bound or configured.
    pub fn bind<A>(to_addr: A) -> MetricResult<UdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(to_addr)?;
        let socket = UdpSocket::bind(local_addr_for(&addr))?;
        socket.set_nonblocking(true)?;

        Self::from(addr, socket)
    }

    /// Address of the remote metric server
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl MetricSink for UdpMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        self.stats
            .record(self.socket.send_to(metric.as_bytes(), self.addr), metric.len())
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }
}
