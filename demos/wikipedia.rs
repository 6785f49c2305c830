//! Example: healthy/fever decoding with three observation symbols.
//!
//! Run with:
//! `cargo run --example wikipedia`

use markov_filter::{viterbi, SensorModel, TransitionModel};

fn main() -> markov_filter::Result<()> {
    // States: 0 = healthy, 1 = fever.
    // Symbols: 0 = normal, 1 = cold, 2 = dizzy.
    let t = TransitionModel::new(vec![vec![0.7, 0.3], vec![0.4, 0.6]])?;
    let s = SensorModel::new(vec![vec![0.5, 0.4, 0.1], vec![0.1, 0.3, 0.6]])?;
    let obs = vec![0, 1, 2];

    let path = viterbi(&obs, &t, &s)?;
    println!("State sequence:");
    for (step, state) in path.iter().enumerate() {
        println!("  t = {step:2}, state = {state}");
    }
    Ok(())
}
