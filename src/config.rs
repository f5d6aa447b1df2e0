// Tally - A best-effort Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::DEFAULT_PORT;

/// Host metrics are sent to when none is configured
pub const DEFAULT_HOST: &str = "localhost";

/// Where to send metrics and how to name them.
///
/// The defaults send metrics to `localhost:8125` without a prefix. Each
/// setting can be changed with the builder style `with_*` methods.
///
/// # Example
///
/// ```
/// use tally::{StatsdConfig, DEFAULT_PORT};
///
/// let config = StatsdConfig::default()
///     .with_host("metrics.example.com")
///     .with_prefix("my.app");
///
/// assert_eq!("metrics.example.com", config.host());
/// assert_eq!(DEFAULT_PORT, config.port());
/// assert_eq!("my.app", config.prefix());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsdConfig {
    host: String,
    port: u16,
    prefix: String,
}

impl StatsdConfig {
    /// Configuration for the given server with no prefix
    pub fn new<H>(host: H, port: u16) -> Self
    where
        H: Into<String>,
    {
        StatsdConfig {
            host: host.into(),
            port,
            prefix: String::new(),
        }
    }

    pub fn with_host<H>(mut self, host: H) -> Self
    where
        H: Into<String>,
    {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the prefix joined to every metric key with a `.`
    pub fn with_prefix<P>(mut self, prefix: P) -> Self
    where
        P: Into<String>,
    {
        self.prefix = prefix.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Host and port in a form that can be resolved to a socket address
    pub fn addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl Default for StatsdConfig {
    fn default() -> Self {
        StatsdConfig::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
