use std::time::Duration;
use tally::prelude::*;
use tally::{ErrorKind, NopMetricSink, Outcome, StatsdClient};
use utils::run_arc_threaded_test;

mod utils;

fn new_nop_client(prefix: &str) -> StatsdClient {
    StatsdClient::from_sink(prefix, NopMetricSink)
}

fn delivered(lines: &[&str]) -> Outcome {
    Outcome::Delivered(lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_statsd_client_update_stats() {
    let client = new_nop_client("client.test");
    let expected = delivered(&["client.test.counter.key:42|c"]);
    assert_eq!(expected, client.update_stats("counter.key", 42).unwrap());
}

#[test]
fn test_statsd_client_update_stats_many() {
    let client = new_nop_client("client.test");
    let expected = delivered(&["client.test.a:5|c", "client.test.b:5|c"]);
    assert_eq!(expected, client.update_stats(["a", "b"], 5).unwrap());
}

#[test]
fn test_statsd_client_update_stats_slice() {
    let client = new_nop_client("client.test");
    let keys: &[&str] = &["a", "b"];
    let expected = delivered(&["client.test.a:-3|c", "client.test.b:-3|c"]);
    assert_eq!(expected, client.update_stats(keys, -3).unwrap());
}

#[test]
fn test_statsd_client_update_stats_empty_batch() {
    let client = new_nop_client("client.test");
    assert_eq!(delivered(&[]), client.update_stats(Vec::<&str>::new(), 1).unwrap());
}

#[test]
fn test_statsd_client_increment() {
    let client = new_nop_client("client.test");
    let expected = delivered(&["client.test.counter.key:1|c"]);
    assert_eq!(expected, client.increment("counter.key").unwrap());
}

#[test]
fn test_statsd_client_decrement() {
    let client = new_nop_client("client.test");
    let expected = delivered(&["client.test.counter.key:-1|c"]);
    assert_eq!(expected, client.decrement("counter.key").unwrap());
}

#[test]
fn test_statsd_client_timing() {
    let client = new_nop_client("client.test");
    let expected = delivered(&["client.test.timer.key:25|ms"]);
    assert_eq!(expected, client.timing("timer.key", 25).unwrap());
}

#[test]
fn test_statsd_client_timing_duration() {
    let client = new_nop_client("client.test");
    let expected = delivered(&["client.test.timer.key:35|ms"]);
    assert_eq!(expected, client.timing("timer.key", Duration::from_millis(35)).unwrap());
}

#[test]
fn test_statsd_client_timing_without_prefix() {
    let client = new_nop_client("");
    assert_eq!(delivered(&["q:42|ms"]), client.timing("q", 42).unwrap());
}

#[test]
fn test_statsd_client_builder_with_rate_error() {
    let client = new_nop_client("client.test");
    let err = client.timing_builder("timer.key", 1).with_sample_rate(0.0).try_send().unwrap_err();
    assert_eq!(ErrorKind::InvalidInput, err.kind());
}

#[test]
fn test_statsd_client_builder_with_rate_above_one() {
    let client = new_nop_client("");
    let res = client.timing_builder("q", 42).with_sample_rate(1.01).try_send();
    assert_eq!(delivered(&["q:42|ms"]), res.unwrap());
}

#[test]
fn test_statsd_client_timing_with_rate_above_one() {
    let client = new_nop_client("");
    assert_eq!(delivered(&["q:42|ms"]), client.timing_with_rate("q", 42, 1.5).unwrap());
}

#[test]
fn test_statsd_client_nop_sink_single_threaded() {
    let client = new_nop_client("tally");
    run_arc_threaded_test(client, 1, 1);
}
