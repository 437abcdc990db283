//! Basic usage of `time_tree`: nested regions, a wrapped function and a completion subscriber.

use std::hint::black_box;

use time_tree::{Timed, post_timing, region, timings};

fn checksum(data: &[u8]) -> u64 {
    data.iter().map(|&b| u64::from(b)).sum()
}

fn main() {
    let subscriber = post_timing().subscribe(|completion| {
        println!(
            "completed {} in {:.6}s",
            completion.stack().join("/"),
            completion.elapsed()
        );
    });

    let data = vec![7_u8; 64 * 1024];
    let mut checksum = Timed::new().wrap_with(checksum);

    for _ in 0..3 {
        let _batch = region("batch");

        {
            let _prepare = region("prepare");
            black_box(data.len());
        }

        black_box(checksum(&data));
    }

    post_timing().unsubscribe(&subscriber);

    println!();
    timings().print_to_stdout();
}
