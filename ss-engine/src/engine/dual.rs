//! The dual-option engine.
use std::io::Write;

use ss_core::errors::*;
use ss_core::Configuration;
use tracing::{
    info,
    warn,
};

use super::{
    DegeneratePolicy,
    EngineOptions,
    SteadyState,
    ValueFormatter,
};
use crate::delay::DelayTable;
use crate::errors::{
    is_degenerate,
    SteadyStateError,
};
use crate::policy::SwitchPolicy;
use crate::sparse::CsrMatrix;
use crate::state_space::StateSpace;
use crate::stationary::{
    self,
    StationaryDistribution,
};
use crate::transition;
use crate::utils::{
    write_row,
    write_table,
};

/// Everything derived from the configuration values.  Each entry only depends on the ones above
/// it; the state space is not in here because it depends on the association matrix alone.
#[derive(Debug, Default)]
struct Cache {
    /// Serving delays.
    delta: Option<DelayTable>,
    /// Probing delays.
    deltabar: Option<DelayTable>,
    /// Normalised generator `Q`.
    generator: Option<CsrMatrix>,
    /// Stationary distribution of `Q`.
    stationary: Option<StationaryDistribution>,
    /// Aggregated per-client delays.
    delays: Option<Vec<f64>>,
}

impl Cache {
    /// Both delay tables, computed on first use.
    fn delay_tables(&mut self, config: &Configuration, space: &StateSpace) -> (&DelayTable, &DelayTable) {
        let delta = self.delta.get_or_insert_with(|| DelayTable::serving(config, space));
        let deltabar = self.deltabar.get_or_insert_with(|| DelayTable::probing(config, space));
        (&*delta, &*deltabar)
    }
}

/// Steady-state analysis of the dual-option model.
///
/// Every getter computes its result on first use and memoizes it; dependencies are always
/// resolved in the order delays, generator, stationary distribution, aggregated delays.
#[derive(Debug)]
pub struct SteadyStateEngine {
    /// Analysed configuration.
    config: Configuration,
    /// Options the engine was built with.
    options: EngineOptions,
    /// Switch rule derived from `options`.
    policy: SwitchPolicy,
    /// State tables of the association matrix.
    space: StateSpace,
    /// Memoized results.
    cache: Cache,
}

impl SteadyStateEngine {
    /// Engine with default options.
    pub fn new(config: Configuration) -> anyhow::Result<Self> {
        Self::with_options(config, EngineOptions::default())
    }

    /// Engine with explicit options.  Fails unless every client has exactly two eligible servers.
    pub fn with_options(config: Configuration, options: EngineOptions) -> anyhow::Result<Self> {
        let space = StateSpace::build(&config)?;
        Ok(Self {
            policy: SwitchPolicy::new(options.tie_break),
            config,
            options,
            space,
            cache: Cache::default(),
        })
    }

    /// Options the engine was built with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// State tables of the configuration.
    pub fn state_space(&self) -> &StateSpace {
        &self.space
    }

    /// `delta`: delays of every client at the server that serves it.
    pub fn serving_delays(&mut self) -> &DelayTable {
        self.cache.delay_tables(&self.config, &self.space).0
    }

    /// `deltabar`: delays of every client at the server it probes.
    pub fn probing_delays(&mut self) -> &DelayTable {
        self.cache.delay_tables(&self.config, &self.space).1
    }

    /// States in which every client remains, in ascending order.  Works whether or not the
    /// generator can be built.
    pub fn absorbing(&mut self) -> Vec<usize> {
        let nstates = self.space.nstates();
        let (delta, deltabar) = self.cache.delay_tables(&self.config, &self.space);
        (0..nstates).filter(|&k| self.policy.is_absorbing(delta, deltabar, k)).collect()
    }

    /// The normalised generator `Q`; fails with [`SteadyStateError::DegenerateChain`] when any
    /// state has no outflow.
    pub fn transition(&mut self) -> anyhow::Result<&CsrMatrix> {
        let q = match self.cache.generator.take() {
            Some(q) => q,
            None => {
                let (delta, deltabar) = self.cache.delay_tables(&self.config, &self.space);
                transition::build_generator(&self.space, delta, deltabar, &self.policy)?
            },
        };
        Ok(&*self.cache.generator.insert(q))
    }

    /// The stationary distribution together with its convergence diagnostics.
    pub fn stationary(&mut self) -> anyhow::Result<&StationaryDistribution> {
        let dist = match self.cache.stationary.take() {
            Some(dist) => dist,
            None => {
                let solver = self.options.solver;
                stationary::solve(self.transition()?, &solver)
            },
        };
        Ok(&*self.cache.stationary.insert(dist))
    }

    /// Stationary probability of every state.
    pub fn probabilities(&mut self) -> anyhow::Result<&[f64]> {
        Ok(self.stationary()?.probabilities.as_slice())
    }

    /// Stationary-weighted serving delays, or the absorbing-state fallback.
    fn compute_delays(&mut self) -> anyhow::Result<Vec<f64>> {
        let outcome = self.probabilities().map(<[f64]>::to_vec);
        match outcome {
            Ok(pi) => Ok(self.serving_delays().weighted_by(&pi)),
            Err(err) if is_degenerate(&err) && self.options.on_degenerate == DegeneratePolicy::Fallback => {
                self.absorbing_delays()
            },
            Err(err) => Err(err),
        }
    }

    /// Serving delays of the lowest-indexed absorbing state.
    fn absorbing_delays(&mut self) -> anyhow::Result<Vec<f64>> {
        let absorbing = self.absorbing();
        let Some(&chosen) = absorbing.first() else {
            return Err(SteadyStateError::no_absorbing_state(self.space.nstates()));
        };

        if absorbing.len() > 1 {
            warn!(?absorbing, chosen, "more than one absorbing state, reporting the lowest-indexed one");
        } else {
            info!(state = chosen, "found an absorbing state");
        }
        Ok(self.serving_delays().column(chosen))
    }

    /// The generator, probabilities and delays part of the dump.
    fn write_steady_state(&mut self, out: &mut dyn Write, fmt: ValueFormatter) -> EmptyResult {
        let q = self.transition()?.to_dense();
        write_table(out, "Steady state state transition matrix", &q, fmt)?;
        write_row(out, "Steady state state probabilities", self.probabilities()?, fmt)?;
        write_row(out, "Steady state average delays", self.steady_state_delays()?, fmt)?;
        Ok(())
    }
}

impl SteadyState for SteadyStateEngine {
    fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    fn steady_state_delays(&mut self) -> anyhow::Result<&[f64]> {
        let delays = match self.cache.delays.take() {
            Some(delays) => delays,
            None => self.compute_delays()?,
        };
        Ok(self.cache.delays.insert(delays).as_slice())
    }

    fn clear(&mut self) {
        self.cache = Cache::default();
    }

    fn debug_print(&mut self, out: &mut dyn Write, with_delays: bool, fmt: ValueFormatter) -> EmptyResult {
        let index = |v: usize| v.to_string();
        let association: Vec<Vec<u8>> = self
            .config
            .association()
            .iter()
            .map(|row| row.iter().map(|&a| u8::from(a)).collect())
            .collect();
        let eligible: Vec<Vec<usize>> = (0..self.space.nclients()).map(|i| self.space.eligible(i).to_vec()).collect();

        write_table(out, "Network delays", self.config.tau(), fmt)?;
        write_row(out, "Requests", self.config.x(), fmt)?;
        write_row(out, "Request rates", self.config.load(), fmt)?;
        write_row(out, "Server rates", self.config.mu(), fmt)?;
        write_table(out, "Associations", &association, &|v: u8| v.to_string())?;
        write_table(out, "Primary state", self.space.serving_table(), &index)?;
        write_table(out, "Probe state", self.space.probing_table(), &index)?;
        write_table(out, "Possible servers", &eligible, &index)?;

        if with_delays {
            let (delta, deltabar) = self.cache.delay_tables(&self.config, &self.space);
            write_table(out, "Average delays per state (serving)", delta.rows(), fmt)?;
            write_table(out, "Average delays per state (probing)", deltabar.rows(), fmt)?;

            if let Err(err) = self.write_steady_state(out, fmt) {
                if !is_degenerate(&err) {
                    return Err(err);
                }
                let absorbing: Vec<_> = self.absorbing().iter().map(ToString::to_string).collect();
                writeln!(out, "Absorbing states: {}", absorbing.join(", "))?;
                self.clear();
            }
        }
        Ok(())
    }
}
