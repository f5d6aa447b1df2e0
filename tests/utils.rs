use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tally::prelude::*;
use tally::StatsdClient;

#[allow(dead_code)]
pub const NUM_THREADS: u64 = 100;
#[allow(dead_code)]
pub const NUM_ITERATIONS: u64 = 1_000;

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: StatsdClient, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                for i in 0..iterations {
                    local_client.update_stats("some.counter", i as i64).unwrap();
                    local_client.update_stats(["some.counter", "other.counter"], 1).unwrap();
                    local_client.increment("some.counter").unwrap();
                    local_client.decrement("some.counter").unwrap();
                    local_client.timing("some.timer", i).unwrap();
                    local_client.timing("some.timer", Duration::from_millis(i)).unwrap();
                    local_client.increment_with_rate("some.sampled", 0.5).unwrap();
                    thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}
