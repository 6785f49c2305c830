use markov_filter::{viterbi, SensorModel, TransitionModel, ViterbiTable};

fn uniform_pair() -> (TransitionModel, SensorModel) {
    (
        TransitionModel::new(vec![vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap(),
        SensorModel::new(vec![vec![0.6, 0.4], vec![0.6, 0.4]]).unwrap(),
    )
}

#[test]
fn zero_probabilities_are_respected() {
    // State 1 is unreachable from state 0 and state 0 only emits symbol 0.
    let t = TransitionModel::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    let s = SensorModel::new(vec![vec![1.0, 0.0], vec![0.5, 0.5]]).unwrap();
    let obs = vec![0, 0, 0];
    let path = viterbi(&obs, &t, &s).unwrap();
    assert_eq!(path, vec![0, 0, 0]);
}

#[test]
fn ties_are_deterministic() {
    let (t, s) = uniform_pair();
    let obs = vec![0, 1, 0, 1];
    let first = ViterbiTable::build(&obs, &t, &s).unwrap();
    let second = ViterbiTable::build(&obs, &t, &s).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.best_path(), vec![0, 0, 0, 0]);
}

#[test]
fn ties_choose_lower_predecessor() {
    // Both predecessors give identical products at step 1; the last
    // emission favours state 1.
    let t = TransitionModel::new(vec![vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap();
    let s = SensorModel::new(vec![vec![0.4, 0.5, 0.1], vec![0.4, 0.1, 0.5]]).unwrap();
    let table = ViterbiTable::build(&[0, 2], &t, &s).unwrap();
    assert_eq!(table.backpointer[1], vec![0, 0]);
    assert_eq!(table.best_path(), vec![0, 1]);
}

#[test]
fn all_zero_candidates_default_to_state_zero() {
    let t = TransitionModel::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    let s = SensorModel::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    let table = ViterbiTable::build(&[1, 0], &t, &s).unwrap();

    assert_eq!(table.values[0].as_slice(), &[0.0, 1.0]);
    // Only state 1 has a positive candidate; state 0 keeps the default.
    assert_eq!(table.backpointer[1], vec![0, 1]);
    // Every path is impossible at step 1, so the row normalises to NaN.
    assert!(table.values[1].iter().all(|v| v.is_nan()));
    assert_eq!(table.best_path(), vec![0, 0]);
}

#[test]
fn short_sequences_with_ties() {
    let (t, s) = uniform_pair();
    let path = viterbi(&[1], &t, &s).unwrap();
    assert_eq!(path, vec![0]);
}
