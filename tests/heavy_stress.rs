#![cfg(feature = "heavy")]
use markov_filter::HmmBuilder;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_obs(rng: &mut StdRng, len: usize, vocab: usize) -> Vec<usize> {
    (0..len).map(|_| rng.gen_range(0..vocab)).collect()
}

#[test]
fn heavy_stress_long_sequences() {
    let hmm = HmmBuilder::new()
        .with_transition(vec![vec![0.9, 0.1], vec![0.2, 0.8]])
        .with_sensor(vec![vec![0.8, 0.2], vec![0.3, 0.7]])
        .build()
        .unwrap();
    let mut rng = StdRng::seed_from_u64(123);
    let obs = random_obs(&mut rng, 200_000, 2);

    // Per-step normalisation keeps every value finite on long inputs.
    let belief = hmm.filter(&obs).unwrap();
    assert!(belief.iter().all(|v| v.is_finite()));
    let back = hmm.back_filter(&obs).unwrap();
    assert!(back.iter().all(|v| v.is_finite()));

    let path = hmm.viterbi(&obs).unwrap();
    assert_eq!(path.len(), obs.len());
    assert!(path.iter().all(|&s| s < 2));
}
