//! Enumeration of the combinatorial client-server assignment states.
//!
//! Each client picks one of its two eligible servers as primary; the other one is probed.  State
//! `k` is the position of the choice vector in the lexicographic product `{0,1}^nclients`, so
//! client 0 owns the most significant bit of `k` and client `nclients - 1` the least significant.
use itertools::Itertools;
use ss_core::config::ConfigError;
use ss_core::Configuration;
use tracing::instrument;

use crate::errors::SteadyStateError;

/// Largest client count whose `2^nclients` state space we agree to materialise.
pub const MAX_CLIENTS: usize = 20;

/// Serving and probing server of every client in every state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSpace {
    /// Server count of the configuration.
    nservers: usize,
    /// `eligible[i]`: the two servers of client `i`, ascending
    eligible: Vec<[usize; 2]>,
    /// `state[i][k]`: server serving client `i` in state `k`
    state: Vec<Vec<usize>>,
    /// `statebar[i][k]`: server probed by client `i` in state `k`
    statebar: Vec<Vec<usize>>,
}

impl StateSpace {
    /// Build the state tables from the association matrix of `config`.  Every client must have
    /// exactly two eligible servers.
    #[instrument(skip(config), fields(nclients = config.nclients(), nservers = config.nservers()))]
    pub fn build(config: &Configuration) -> anyhow::Result<Self> {
        let nclients = config.nclients();
        if nclients > MAX_CLIENTS {
            return Err(SteadyStateError::too_many_clients(nclients));
        }

        let eligible = (0..nclients)
            .map(|i| {
                <[usize; 2]>::try_from(config.eligible_servers(i)).map_err(|servers| {
                    ConfigError::wrong_eligible_count(format!(
                        "client {i} has {} eligible servers, expected 2",
                        servers.len()
                    ))
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let nstates = 1usize << nclients;
        let mut state = vec![vec![0; nstates]; nclients];
        let mut statebar = vec![vec![0; nstates]; nclients];
        for (k, choices) in (0..nclients).map(|_| 0..2usize).multi_cartesian_product().enumerate() {
            for (i, &choice) in choices.iter().enumerate() {
                state[i][k] = eligible[i][choice];
                statebar[i][k] = eligible[i][1 - choice];
            }
        }

        Ok(Self { nservers: config.nservers(), eligible, state, statebar })
    }

    /// Number of clients.
    pub fn nclients(&self) -> usize {
        self.eligible.len()
    }

    /// Number of servers, eligible or not.
    pub fn nservers(&self) -> usize {
        self.nservers
    }

    /// Number of states, `2^nclients`.
    pub fn nstates(&self) -> usize {
        1 << self.nclients()
    }

    /// The two servers client `client` may be associated with, in ascending order.
    pub fn eligible(&self, client: usize) -> [usize; 2] {
        self.eligible[client]
    }

    /// Server actively serving `client` in state `state`.
    pub fn serving(&self, client: usize, state: usize) -> usize {
        self.state[client][state]
    }

    /// Server probed by `client` in state `state`.
    pub fn probing(&self, client: usize, state: usize) -> usize {
        self.statebar[client][state]
    }

    /// Bit of the state index that holds the choice of `client`.
    pub fn choice_mask(&self, client: usize) -> usize {
        1 << (self.nclients() - 1 - client)
    }

    /// `nclients x nstates` serving servers.
    pub fn serving_table(&self) -> &[Vec<usize>] {
        &self.state
    }

    /// `nclients x nstates` probed servers.
    pub fn probing_table(&self) -> &[Vec<usize>] {
        &self.statebar
    }
}
