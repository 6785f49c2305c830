use markov_filter::{back_filter, filter, viterbi, SensorModel, TransitionModel};
use proptest::prelude::*;

const STATES: usize = 3;
const SYMBOLS: usize = 2;

fn stochastic(rows: usize, cols: usize, raw: &[f64]) -> Vec<Vec<f64>> {
    raw.chunks(cols)
        .take(rows)
        .map(|chunk| {
            let sum: f64 = chunk.iter().sum();
            chunk.iter().map(|v| v / sum).collect()
        })
        .collect()
}

fn models(raw_t: &[f64], raw_s: &[f64]) -> (TransitionModel, SensorModel) {
    (
        TransitionModel::new(stochastic(STATES, STATES, raw_t)).unwrap(),
        SensorModel::new(stochastic(STATES, SYMBOLS, raw_s)).unwrap(),
    )
}

/// Unnormalised probability of one full state path under a flat prior.
fn path_probability(path: &[usize], obs: &[usize], t: &TransitionModel, s: &SensorModel) -> f64 {
    let mut p = 1.0 / STATES as f64 * s[path[0]][obs[0]];
    for k in 1..obs.len() {
        p *= t[path[k - 1]][path[k]] * s[path[k]][obs[k]];
    }
    p
}

/// Enumerate every state path and return the best probability.
fn brute_force_best(obs: &[usize], t: &TransitionModel, s: &SensorModel) -> f64 {
    let total = STATES.pow(obs.len() as u32);
    let mut best = 0.0f64;
    let mut path = vec![0usize; obs.len()];
    for code in 0..total {
        let mut c = code;
        for slot in path.iter_mut() {
            *slot = c % STATES;
            c /= STATES;
        }
        best = best.max(path_probability(&path, obs, t, s));
    }
    best
}

/// Forward recursion without intermediate normalisation.
fn full_forward(obs: &[usize], t: &TransitionModel, s: &SensorModel) -> Vec<f64> {
    let mut alpha = vec![1.0 / STATES as f64; STATES];
    for &e in obs {
        let predicted: Vec<f64> = (0..STATES)
            .map(|i| (0..STATES).map(|j| t[j][i] * alpha[j]).sum())
            .collect();
        alpha = (0..STATES).map(|i| predicted[i] * s[i][e]).collect();
    }
    let z: f64 = alpha.iter().sum();
    alpha.iter().map(|v| v / z).collect()
}

/// Backward recursion without intermediate normalisation.
fn full_backward(obs: &[usize], t: &TransitionModel, s: &SensorModel) -> Vec<f64> {
    let mut beta = vec![1.0 / STATES as f64; STATES];
    for &e in obs.iter().rev() {
        let weighted: Vec<f64> = (0..STATES).map(|i| beta[i] * s[i][e]).collect();
        beta = (0..STATES)
            .map(|i| (0..STATES).map(|j| t[i][j] * weighted[j]).sum())
            .collect();
    }
    let z: f64 = beta.iter().sum();
    beta.iter().map(|v| v / z).collect()
}

proptest! {
    #[test]
    fn viterbi_matches_brute_force(
        raw_t in proptest::collection::vec(0.05f64..1.0, STATES * STATES),
        raw_s in proptest::collection::vec(0.05f64..1.0, STATES * SYMBOLS),
        obs in proptest::collection::vec(0usize..SYMBOLS, 1..7),
    ) {
        let (t, s) = models(&raw_t, &raw_s);
        let path = viterbi(&obs, &t, &s).unwrap();
        prop_assert_eq!(path.len(), obs.len());
        prop_assert!(path.iter().all(|&state| state < STATES));

        let best = brute_force_best(&obs, &t, &s);
        let got = path_probability(&path, &obs, &t, &s);
        prop_assert!((best - got).abs() <= best * 1e-9, "best {} got {}", best, got);
    }

    #[test]
    fn filter_matches_full_recursion(
        raw_t in proptest::collection::vec(0.05f64..1.0, STATES * STATES),
        raw_s in proptest::collection::vec(0.05f64..1.0, STATES * SYMBOLS),
        obs in proptest::collection::vec(0usize..SYMBOLS, 0..20),
    ) {
        let (t, s) = models(&raw_t, &raw_s);
        let got = filter(&obs, &t, &s).unwrap();
        let want = full_forward(&obs, &t, &s);
        for (g, w) in got.iter().zip(&want) {
            prop_assert!((g - w).abs() < 1e-9);
        }
    }

    #[test]
    fn back_filter_matches_full_recursion(
        raw_t in proptest::collection::vec(0.05f64..1.0, STATES * STATES),
        raw_s in proptest::collection::vec(0.05f64..1.0, STATES * SYMBOLS),
        obs in proptest::collection::vec(0usize..SYMBOLS, 0..20),
    ) {
        let (t, s) = models(&raw_t, &raw_s);
        let got = back_filter(&obs, &t, &s).unwrap();
        let want = full_backward(&obs, &t, &s);
        for (g, w) in got.iter().zip(&want) {
            prop_assert!((g - w).abs() < 1e-9);
        }
    }
}
