//! Example: the umbrella world, smoothed at every time index.
//!
//! Run with:
//! `cargo run --example umbrella`

use markov_filter::{HmmBuilder, Result};

fn main() -> Result<()> {
    // State 0 = rain, symbol 0 = umbrella seen.
    let hmm = HmmBuilder::new()
        .with_transition(vec![vec![0.7, 0.3], vec![0.3, 0.7]])
        .with_sensor(vec![vec![0.9, 0.1], vec![0.2, 0.8]])
        .require_stochastic(1e-12)
        .build()?;
    let obs = vec![0, 0, 1, 0, 0];

    for (at, belief) in hmm.filter_all(&obs)?.iter().enumerate() {
        println!("Filtered at {}: {belief}", at + 1);
    }
    for (at, belief) in hmm.smooth_all(&obs)?.iter().enumerate() {
        println!("Estimate for {at}: {belief}");
    }
    println!("Most likely states: {:?}", hmm.viterbi(&obs)?);
    Ok(())
}
