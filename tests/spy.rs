use crossbeam_channel::Receiver;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use tally::ext::{MetricBackend, Sampler};
use tally::prelude::*;
use tally::test::{DelegatingMetricSink, ErrorMetricSink};
use tally::{FixedSampler, MetricSink, Outcome, SpyMetricSink, StatsdClient};

mod utils;
use utils::{run_arc_threaded_test, NUM_ITERATIONS, NUM_THREADS};

/// Deterministic sampler so the statistical tests never flake
struct SeededSampler {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededSampler {
    fn new(seed: u64) -> Self {
        SeededSampler {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Sampler for SeededSampler {
    fn draw(&self) -> f64 {
        self.rng.lock().unwrap().gen::<f64>()
    }
}

fn new_spy_client(prefix: &str) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    (rx, StatsdClient::from_sink(prefix, sink))
}

fn new_seeded_spy_client(prefix: &str, seed: u64) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(prefix, sink)
        .with_sampler(SeededSampler::new(seed))
        .build();
    (rx, client)
}

fn drain(rx: &Receiver<Vec<u8>>) -> Vec<String> {
    rx.try_iter().map(|v| String::from_utf8(v).unwrap()).collect()
}

#[test]
fn test_statsd_client_spy_sink_full_rate_batch() {
    let (rx, client) = new_spy_client("");
    client.update_stats(["a", "b"], 5).unwrap();
    client.timing("q", 42).unwrap();

    assert_eq!(vec!["a:5|c", "b:5|c", "q:42|ms"], drain(&rx));
}

#[test]
fn test_statsd_client_spy_sink_increment_matches_update_stats() {
    let (rx, client) = new_spy_client("app");
    client.increment(["x", "y"]).unwrap();
    client.update_stats(["x", "y"], 1).unwrap();
    client.decrement("x").unwrap();
    client.update_stats("x", -1).unwrap();

    let lines = drain(&rx);
    assert_eq!(lines[0..2], lines[2..4]);
    assert_eq!(lines[4], lines[5]);
    assert_eq!("app.x:-1|c", lines[4]);
}

#[test]
fn test_statsd_client_spy_sink_sampling_is_all_or_nothing() {
    let (rx, client) = new_seeded_spy_client("", 7);
    let keys = ["a", "b", "c"];

    for _ in 0..1_000 {
        let outcome = client.increment_with_rate(keys, 0.5).unwrap();
        let lines = drain(&rx);

        match outcome {
            Outcome::SampledOut => assert!(lines.is_empty()),
            Outcome::Delivered(sent) => {
                assert_eq!(vec!["a:1|c|@0.5", "b:1|c|@0.5", "c:1|c|@0.5"], sent);
                assert_eq!(sent, lines);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

#[test]
fn test_statsd_client_spy_sink_sampling_rate_is_respected() {
    let (rx, client) = new_seeded_spy_client("", 1234);
    let calls = 10_000;

    let delivered = (0..calls)
        .map(|_| client.timing_with_rate("q", 1, 0.25).unwrap())
        .filter(|o| !o.is_sampled_out())
        .count();

    let lines = drain(&rx);
    assert_eq!(delivered, lines.len());
    assert!(lines.iter().all(|l| l == "q:1|ms|@0.25"));

    // Expected 2500, this is well over five standard deviations either way
    assert!(delivered > 2_200 && delivered < 2_800, "delivered {}", delivered);
}

#[test]
fn test_statsd_client_spy_sink_never_sampled_out_when_draw_is_zero() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder("", sink)
        .with_sampler(FixedSampler::new(0.0))
        .build();

    for _ in 0..100 {
        client.increment_with_rate("k", 0.0001).unwrap();
    }

    assert_eq!(100, drain(&rx).len());
}

#[test]
fn test_statsd_client_spy_sink_raw_send() {
    let (rx, client) = new_spy_client("raw");
    let lines = vec![("hits", "3|c"), ("latency", "12|ms")];
    let outcome = client.send(lines, 1.0).unwrap();

    assert_eq!(vec!["raw.hits:3|c", "raw.latency:12|ms"], outcome.sent());
    assert_eq!(vec!["raw.hits:3|c", "raw.latency:12|ms"], drain(&rx));
}

#[test]
fn test_statsd_client_transmit_failure_does_not_stop_batch() {
    let sink = Arc::new(ErrorMetricSink::matching("second"));
    let client = StatsdClient::from_sink("", DelegatingMetricSink::new(sink));

    let outcome = client.update_stats(["first", "second", "third"], 1).unwrap();

    assert!(!outcome.is_success());
    assert_eq!(vec!["first:1|c", "third:1|c"], outcome.sent());
    assert_eq!(vec!["second:1|c"], outcome.failed());
}

#[test]
fn test_statsd_client_spy_sink_full_channel_reports_failures() {
    let (rx, sink) = SpyMetricSink::with_capacity(2);
    let sink = Arc::new(sink);
    let client = StatsdClient::from_sink("", DelegatingMetricSink::new(Arc::clone(&sink)));

    let outcome = client.increment(["a", "b", "c"]).unwrap();

    assert_eq!(
        Outcome::TransmitFailed {
            sent: vec!["a:1|c".to_string(), "b:1|c".to_string()],
            failed: vec!["c:1|c".to_string()],
        },
        outcome
    );

    let stats = client.stats();
    assert_eq!(2, stats.packets_sent);
    assert_eq!(1, stats.packets_dropped);
    assert_eq!(sink.stats(), stats);
    assert_eq!(2, drain(&rx).len());
}

#[test]
fn test_statsd_client_spy_sink_single_threaded() {
    let (_rx, client) = new_spy_client("tally");
    run_arc_threaded_test(client, 1, 1);
}

#[ignore]
#[test]
fn test_statsd_client_spy_sink_many_threaded() {
    let (_rx, client) = new_spy_client("tally");
    run_arc_threaded_test(client, NUM_THREADS, NUM_ITERATIONS);
}
