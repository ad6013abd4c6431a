//! Unit tests of the analysis pipeline, with the shared configuration fixtures.
mod policy_test;
mod state_space_test;
mod stationary_test;

use rstest::*;
use ss_core::Configuration;

fn flags(rows: &[&[u8]]) -> Vec<Vec<bool>> {
    rows.iter().map(|row| row.iter().map(|&f| f == 1).collect()).collect()
}

/// Two clients with the same two identical servers.
#[fixture]
pub fn symmetric() -> Configuration {
    Configuration::new(
        0.1,
        vec![vec![0.0, 0.0], vec![0.0, 0.0]],
        vec![1.0, 1.0],
        vec![0.1, 0.1],
        vec![1.0, 1.0],
        flags(&[&[1, 1], &[1, 1]]),
    )
    .unwrap()
}

/// Two clients sharing the middle one of three servers.
#[fixture]
pub fn shared_middle() -> Configuration {
    Configuration::new(
        0.5,
        vec![vec![1.0, 1.0, 3.0], vec![2.0, 2.0, 1.0]],
        vec![1.0, 1.0],
        vec![0.2, 0.2],
        vec![1.0, 2.0, 1.0],
        flags(&[&[1, 1, 0], &[0, 1, 1]]),
    )
    .unwrap()
}

/// Three clients on a ring of three servers.
#[fixture]
pub fn ring() -> Configuration {
    Configuration::new(
        0.3,
        vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 1.0], vec![2.0, 1.0, 0.0]],
        vec![1.0, 2.0, 1.0],
        vec![0.3, 0.2, 0.25],
        vec![1.0, 1.5, 1.2],
        flags(&[&[1, 1, 0], &[0, 1, 1], &[1, 0, 1]]),
    )
    .unwrap()
}

/// Two clients, each with a single server.
#[fixture]
pub fn single_server() -> Configuration {
    Configuration::new(
        0.1,
        vec![vec![1.0, 0.0], vec![0.0, 2.0]],
        vec![1.0, 1.0],
        vec![0.2, 0.3],
        vec![1.0, 2.0],
        flags(&[&[1, 0], &[1, 0]]),
    )
    .unwrap()
}
