use assertables::*;
use rstest::*;
use ss_core::Configuration;
use tracing_test::traced_test;

use super::*;
use crate::delay::DelayTable;
use crate::policy::SwitchPolicy;
use crate::sparse::{
    CsrBuilder,
    CsrMatrix,
};
use crate::state_space::StateSpace;
use crate::stationary::{
    solve,
    uniformize,
    SolverOptions,
};
use crate::transition::build_generator;

fn generator(config: &Configuration) -> CsrMatrix {
    let space = StateSpace::build(config).unwrap();
    let delta = DelayTable::serving(config, &space);
    let deltabar = DelayTable::probing(config, &space);
    build_generator(&space, &delta, &deltabar, &SwitchPolicy::default()).unwrap()
}

fn two_cycle() -> CsrMatrix {
    let mut builder = CsrBuilder::new(2);
    builder.push_row([(0, -1.0), (1, 1.0)]);
    builder.push_row([(0, 1.0), (1, -1.0)]);
    builder.finish()
}

#[rstest]
fn test_uniformize_is_stochastic(shared_middle: Configuration) {
    let p = uniformize(&generator(&shared_middle), 1.001);
    for r in 0..p.nrows() {
        assert_in_delta!(p.row_sum(r), 1.0, 1e-12);
        assert_gt!(p.get(r, r), 0.0);
        for (_, v) in p.row(r) {
            assert_ge!(v, 0.0);
        }
    }
}

#[rstest]
fn test_solve_shared_middle(shared_middle: Configuration) {
    let dist = solve(&generator(&shared_middle), &SolverOptions::default());

    assert!(dist.converged);
    assert_le!(dist.residual, 1e-3);
    assert_in_delta!(dist.probabilities.iter().sum::<f64>(), 1.0, 1e-9);
    let expected = [0.000_151, 0.499_923, 0.000_003_6, 0.499_923];
    for (&p, &e) in dist.probabilities.iter().zip(&expected) {
        assert_in_delta!(p, e, 1e-3);
    }
}

// The uniformisation margin is what lets a period-2 chain converge.
#[rstest]
fn test_solve_periodic_chain() {
    let dist = solve(&two_cycle(), &SolverOptions::default());
    assert!(dist.converged);
    assert_in_delta!(dist.probabilities[0], 0.5, 1e-2);
    assert_in_delta!(dist.probabilities[1], 0.5, 1e-2);
}

#[test]
#[traced_test]
fn test_iteration_cap() {
    let options = SolverOptions { tolerance: 1e-12, max_iterations: 1, ..Default::default() };
    let dist = solve(&two_cycle(), &options);

    assert!(!dist.converged);
    assert_eq!(dist.iterations, 1);
    assert_gt!(dist.residual, 1e-12);
    assert!(logs_contain("iteration cap reached before convergence"));
}

#[rstest]
fn test_solve_empty() {
    let dist = solve(&CsrBuilder::new(0).finish(), &SolverOptions::default());
    assert!(dist.converged);
    assert!(dist.probabilities.is_empty());
}
