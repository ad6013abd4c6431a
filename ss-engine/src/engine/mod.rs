//! Steady-state engines.
//!
//! [`SteadyStateEngine`] handles the dual-option model: every client is eligible for exactly two
//! servers and may switch between them.  [`SingleAssociationEngine`] is the closed-form special
//! case in which every client has a single server.  [`Engine`] picks one of the two from the
//! shape of the association matrix.
mod dual;
mod single;

use std::io::Write;

pub use dual::SteadyStateEngine;
use serde::{
    Deserialize,
    Serialize,
};
pub use single::SingleAssociationEngine;
use ss_core::errors::*;
use ss_core::Configuration;

use crate::policy::TieBreak;
use crate::stationary::SolverOptions;

/// Formats a single number for [`SteadyState::debug_print`].
pub type ValueFormatter<'a> = &'a dyn Fn(f64) -> String;

/// What [`SteadyState::steady_state_delays`] does when the chain has absorbing states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Report the serving delays of the lowest-indexed absorbing state.
    #[default]
    Fallback,
    /// Propagate the degeneracy error.
    Reject,
}

/// Knobs shared by every analysis of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Decision rule at equal serving and probing delays.
    pub tie_break: TieBreak,
    /// Behaviour on a chain with absorbing states.
    pub on_degenerate: DegeneratePolicy,
    /// Power-iteration settings.
    pub solver: SolverOptions,
}

/// Common interface of the dual-option and single-option engines.
pub trait SteadyState {
    /// The configuration being analysed.
    fn configuration(&self) -> &Configuration;

    /// Mutable access to the engine-held configuration.  Cached results are *not* invalidated;
    /// call [`SteadyState::clear`] after mutating.
    fn configuration_mut(&mut self) -> &mut Configuration;

    /// Long-run average delay of every client, in client order.  Memoized until the next
    /// [`SteadyState::clear`].
    fn steady_state_delays(&mut self) -> anyhow::Result<&[f64]>;

    /// Drop every cached result derived from the configuration values.
    fn clear(&mut self);

    /// Human-readable dump of the inputs and, if `with_delays`, of every derived table.
    fn debug_print(&mut self, out: &mut dyn Write, with_delays: bool, fmt: ValueFormatter) -> EmptyResult;
}

/// Either engine, chosen from the association matrix.
#[derive(Debug)]
pub enum Engine {
    /// Two eligible servers per client.
    Dual(SteadyStateEngine),
    /// One eligible server per client.
    Single(SingleAssociationEngine),
}

impl Engine {
    /// Pick the single-option engine when every client has exactly one eligible server and the
    /// dual-option engine otherwise (which rejects any count other than two).
    pub fn new(config: Configuration, options: EngineOptions) -> anyhow::Result<Self> {
        let single = (0..config.nclients()).all(|i| config.eligible_servers(i).len() == 1);
        if single {
            Ok(Self::Single(SingleAssociationEngine::new(config)?))
        } else {
            Ok(Self::Dual(SteadyStateEngine::with_options(config, options)?))
        }
    }

    /// The dual-option engine, for access to its intermediate tables.
    pub fn as_dual(&mut self) -> Option<&mut SteadyStateEngine> {
        match self {
            Self::Dual(engine) => Some(engine),
            Self::Single(_) => None,
        }
    }

    /// The wrapped engine.
    fn inner(&self) -> &dyn SteadyState {
        match self {
            Self::Dual(engine) => engine,
            Self::Single(engine) => engine,
        }
    }

    /// The wrapped engine, mutably.
    fn inner_mut(&mut self) -> &mut dyn SteadyState {
        match self {
            Self::Dual(engine) => engine,
            Self::Single(engine) => engine,
        }
    }
}

impl SteadyState for Engine {
    fn configuration(&self) -> &Configuration {
        self.inner().configuration()
    }

    fn configuration_mut(&mut self) -> &mut Configuration {
        self.inner_mut().configuration_mut()
    }

    fn steady_state_delays(&mut self) -> anyhow::Result<&[f64]> {
        self.inner_mut().steady_state_delays()
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn debug_print(&mut self, out: &mut dyn Write, with_delays: bool, fmt: ValueFormatter) -> EmptyResult {
        self.inner_mut().debug_print(out, with_delays, fmt)
    }
}
