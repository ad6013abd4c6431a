use rstest::*;
use ss_core::Configuration;

use super::*;
use crate::delay::{
    DelayTable,
    UNSTABLE,
};
use crate::policy::{
    Decision,
    SwitchPolicy,
    TieBreak,
};
use crate::state_space::StateSpace;

#[rstest]
#[case::faster_probe(2.0, 1.5, Decision::Leave, Decision::Leave)]
#[case::slower_probe(1.5, 2.0, Decision::Remain, Decision::Remain)]
#[case::tie(1.5, 1.5, Decision::Remain, Decision::Leave)]
#[case::unstable_primary(UNSTABLE, 3.0, Decision::Leave, Decision::Leave)]
#[case::unstable_probe(3.0, UNSTABLE, Decision::Remain, Decision::Remain)]
#[case::both_unstable(UNSTABLE, UNSTABLE, Decision::Leave, Decision::Leave)]
fn test_decide(#[case] delta: f64, #[case] deltabar: f64, #[case] remain: Decision, #[case] leave: Decision) {
    assert_eq!(SwitchPolicy::new(TieBreak::Remain).decide(delta, deltabar), remain);
    assert_eq!(SwitchPolicy::new(TieBreak::Leave).decide(delta, deltabar), leave);
}

#[rstest]
fn test_default_tie_break() {
    assert_eq!(SwitchPolicy::default().tie_break(), TieBreak::Remain);
    assert_eq!(serde_json::to_string(&TieBreak::Leave).unwrap(), "\"leave\"");
}

#[rstest]
fn test_next_servers(shared_middle: Configuration) {
    let space = StateSpace::build(&shared_middle).unwrap();
    let policy = SwitchPolicy::default();
    assert_eq!(policy.next_servers(&space, Decision::Remain, 1, 0), vec![1]);
    assert_eq!(policy.next_servers(&space, Decision::Leave, 1, 0), vec![1, 2]);
    assert_eq!(policy.next_servers(&space, Decision::Leave, 0, 3), vec![1, 0]);
}

#[rstest]
#[case::remain(TieBreak::Remain, vec![1, 2])]
#[case::leave(TieBreak::Leave, vec![])]
fn test_symmetric_absorbing(symmetric: Configuration, #[case] tie_break: TieBreak, #[case] expected: Vec<usize>) {
    let space = StateSpace::build(&symmetric).unwrap();
    let delta = DelayTable::serving(&symmetric, &space);
    let deltabar = DelayTable::probing(&symmetric, &space);
    let policy = SwitchPolicy::new(tie_break);

    let absorbing: Vec<_> = (0..space.nstates()).filter(|&k| policy.is_absorbing(&delta, &deltabar, k)).collect();
    assert_eq!(absorbing, expected);
}

#[rstest]
fn test_decisions(shared_middle: Configuration) {
    let space = StateSpace::build(&shared_middle).unwrap();
    let delta = DelayTable::serving(&shared_middle, &space);
    let deltabar = DelayTable::probing(&shared_middle, &space);
    let policy = SwitchPolicy::default();

    assert_eq!(policy.decisions(&delta, &deltabar, 0), vec![Decision::Leave, Decision::Leave]);
    assert_eq!(policy.decisions(&delta, &deltabar, 1), vec![Decision::Leave, Decision::Remain]);
    assert!(!policy.is_absorbing(&delta, &deltabar, 1));
}
