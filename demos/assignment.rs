//! Example: decoding and smoothing a short two-state sequence.
//!
//! Run with:
//! `cargo run --example assignment`

use markov_filter::{HmmBuilder, Result};

/// Index of a boolean state or symbol: `true` maps to 0, `false` to 1.
fn as_state(value: bool) -> usize {
    if value {
        0
    } else {
        1
    }
}

fn main() -> Result<()> {
    let hmm = HmmBuilder::new()
        .with_transition(vec![vec![0.7, 0.3], vec![0.4, 0.6]])
        .with_sensor(vec![vec![0.8, 0.2], vec![0.3, 0.7]])
        .build()?;
    let obs = vec![as_state(true), as_state(false), as_state(true)];

    let table = hmm.viterbi_table(&obs)?;
    print!("{table}");

    print!("Most likely states: ");
    for state in table.best_path() {
        print!("{state} -> ");
    }
    println!("end.");

    for at in 1..=obs.len() {
        println!("Estimate for {at}: {}", hmm.estimate(at, &obs)?);
    }
    Ok(())
}
