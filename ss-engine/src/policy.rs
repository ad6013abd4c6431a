//! The per-client "remain or leave" decision.
use serde::{
    Deserialize,
    Serialize,
};

use crate::delay::{
    is_unstable,
    DelayTable,
};
use crate::state_space::StateSpace;

/// How a client decides when serving and probing delays are exactly equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Ties keep the client at its primary server.
    #[default]
    Remain,
    /// Ties make the client eligible to switch (`deltabar <= delta`).
    Leave,
}

/// Outcome for one client in one state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Keep the current primary server.
    Remain,
    /// May move to the probed server.
    Leave,
}

/// The remain-or-leave rule applied to every client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwitchPolicy {
    /// Rule at equal delays.
    tie_break: TieBreak,
}

impl SwitchPolicy {
    /// Policy with the given tie rule.
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Rule at equal delays.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Decide from the serving delay `delta` and the probing delay `deltabar`.
    ///
    /// An unstable primary is always left; an unstable secondary is never chosen over a stable
    /// primary; otherwise the client leaves when probing is faster.
    #[allow(clippy::float_cmp)]
    pub fn decide(&self, delta: f64, deltabar: f64) -> Decision {
        if is_unstable(delta) {
            Decision::Leave
        } else if is_unstable(deltabar) {
            Decision::Remain
        } else if deltabar < delta || (deltabar == delta && self.tie_break == TieBreak::Leave) {
            Decision::Leave
        } else {
            Decision::Remain
        }
    }

    /// Decisions of every client in `state`.
    pub fn decisions(&self, delta: &DelayTable, deltabar: &DelayTable, state: usize) -> Vec<Decision> {
        (0..delta.rows().len())
            .map(|i| self.decide(delta.get(i, state), deltabar.get(i, state)))
            .collect()
    }

    /// Servers client `client` may occupy at the next step when leaving `state`.
    pub fn next_servers(&self, space: &StateSpace, decision: Decision, client: usize, state: usize) -> Vec<usize> {
        match decision {
            Decision::Remain => vec![space.serving(client, state)],
            Decision::Leave => vec![space.serving(client, state), space.probing(client, state)],
        }
    }

    /// A state is absorbing when no client has an incentive to switch.
    pub fn is_absorbing(&self, delta: &DelayTable, deltabar: &DelayTable, state: usize) -> bool {
        (0..delta.rows().len()).all(|i| self.decide(delta.get(i, state), deltabar.get(i, state)) == Decision::Remain)
    }
}
