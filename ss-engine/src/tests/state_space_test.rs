use assertables::*;
use rstest::*;
use ss_core::config::ConfigError;
use ss_core::Configuration;

use super::*;
use crate::state_space::StateSpace;

#[rstest]
fn test_build_two_clients(shared_middle: Configuration) {
    let space = StateSpace::build(&shared_middle).unwrap();
    assert_eq!(space.nclients(), 2);
    assert_eq!(space.nservers(), 3);
    assert_eq!(space.nstates(), 4);
    assert_eq!(space.eligible(0), [0, 1]);
    assert_eq!(space.eligible(1), [1, 2]);

    // client 0 owns the most significant bit of the state index
    assert_eq!(space.serving_table(), &[vec![0, 0, 1, 1], vec![1, 2, 1, 2]]);
    assert_eq!(space.probing_table(), &[vec![1, 1, 0, 0], vec![2, 1, 2, 1]]);
    assert_eq!(space.choice_mask(0), 0b10);
    assert_eq!(space.choice_mask(1), 0b01);
}

#[rstest]
fn test_serving_and_probing_differ(ring: Configuration) {
    let space = StateSpace::build(&ring).unwrap();
    assert_eq!(space.nstates(), 8);
    for i in 0..space.nclients() {
        for k in 0..space.nstates() {
            let eligible = space.eligible(i);
            assert_ne!(space.serving(i, k), space.probing(i, k));
            assert!(eligible.contains(&space.serving(i, k)));
            assert!(eligible.contains(&space.probing(i, k)));
        }
    }
}

#[rstest]
fn test_wrong_eligible_count(single_server: Configuration) {
    let err = StateSpace::build(&single_server).unwrap_err();
    assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::WrongEligibleCount(_))));
    assert_contains!(err.to_string(), "client 0 has 1 eligible servers");
}

#[rstest]
fn test_three_eligible_servers_rejected() {
    let config = Configuration::new(
        0.2,
        vec![vec![0.0, 0.0, 0.0]],
        vec![1.0],
        vec![0.1],
        vec![1.0, 1.0, 1.0],
        vec![vec![true, true, true]],
    )
    .unwrap();
    let err = StateSpace::build(&config).unwrap_err();
    assert_contains!(err.to_string(), "has 3 eligible servers, expected 2");
}
