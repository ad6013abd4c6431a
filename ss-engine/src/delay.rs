//! Per-client, per-state queueing delays.
//!
//! Each server is modelled as an M/M/1 queue whose capacity is shared by every client that uses
//! it: clients served there consume their full load, clients probing there consume a
//! `chi`-discounted share.  The delay of client `i` at server `s` is
//!
//! ```text
//! tau[i][s] + x[i] * mu[s] / residual
//! ```
//!
//! where `residual` is `mu[s]` minus the capacity taken by every client at `s`, client `i` itself
//! included.  A non-positive residual would make the queue grow without bound; such entries hold
//! the [`UNSTABLE`] sentinel instead.
use ss_core::Configuration;
use tracing::instrument;

use crate::state_space::StateSpace;

/// Delay reported for a queue without positive residual capacity.
pub const UNSTABLE: f64 = -1.0;

/// True for the [`UNSTABLE`] sentinel.
pub fn is_unstable(delay: f64) -> bool {
    delay < 0.0
}

/// Whether the delay is taken at the server that serves the client or at the one it probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Delay at the serving server (`delta`).
    Serving,
    /// Delay at the probed server (`deltabar`).
    Probing,
}

/// `nclients x nstates` delays for one [`Role`].
#[derive(Clone, Debug, PartialEq)]
pub struct DelayTable {
    /// Which server the delays are taken at.
    role: Role,
    /// `rows[i][k]`: delay of client `i` in state `k`
    rows: Vec<Vec<f64>>,
}

impl DelayTable {
    /// Delays of every client in every state of `space` for `role`.
    #[instrument(skip(config, space), fields(nstates = space.nstates()))]
    pub fn compute(config: &Configuration, space: &StateSpace, role: Role) -> Self {
        let rows = (0..space.nclients())
            .map(|i| (0..space.nstates()).map(|k| client_delay(config, space, role, i, k)).collect())
            .collect();
        Self { role, rows }
    }

    /// Shorthand for [`Role::Serving`].
    pub fn serving(config: &Configuration, space: &StateSpace) -> Self {
        Self::compute(config, space, Role::Serving)
    }

    /// Shorthand for [`Role::Probing`].
    pub fn probing(config: &Configuration, space: &StateSpace) -> Self {
        Self::compute(config, space, Role::Probing)
    }

    /// Role the table was computed for.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Delay of `client` in `state`.
    pub fn get(&self, client: usize, state: usize) -> f64 {
        self.rows[client][state]
    }

    /// One row per client.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Delays of every client in a single state.
    pub fn column(&self, state: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[state]).collect()
    }

    /// Per-client expectation of the delay under the state distribution `weights`, i.e. the
    /// matrix-vector product `delta . pi`.
    pub fn weighted_by(&self, weights: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(weights).map(|(d, w)| d * w).sum())
            .collect()
    }
}

/// Delay of client `i` in state `k` at the server given by `role`.
fn client_delay(config: &Configuration, space: &StateSpace, role: Role, i: usize, k: usize) -> f64 {
    let chi = config.chi();
    let load = config.load();
    let (server, own_load) = match role {
        Role::Serving => (space.serving(i, k), load[i]),
        Role::Probing => (space.probing(i, k), chi * load[i]),
    };
    let mu = config.mu()[server];

    let mut residual = mu - own_load;
    for h in (0..space.nclients()).filter(|&h| h != i) {
        let served = indicator(space.serving(h, k) == server);
        let probed = indicator(space.probing(h, k) == server);
        residual -= load[h] * (served + chi * probed);
    }

    if residual > 0.0 {
        config.tau()[i][server] + (config.x()[i] * mu) / residual
    } else {
        UNSTABLE
    }
}

/// 1.0 or 0.0.
fn indicator(cond: bool) -> f64 {
    if cond {
        1.0
    } else {
        0.0
    }
}
