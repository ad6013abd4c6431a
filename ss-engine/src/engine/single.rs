//! The single-option engine.
use std::io::Write;

use ss_core::config::ConfigError;
use ss_core::errors::*;
use ss_core::Configuration;

use super::{
    SteadyState,
    ValueFormatter,
};
use crate::delay::UNSTABLE;
use crate::utils::{
    write_row,
    write_table,
};

/// Closed-form delays when every client is associated with exactly one server: a plain M/M/1
/// queue per server, loaded by all of its clients.
#[derive(Debug)]
pub struct SingleAssociationEngine {
    /// Analysed configuration.
    config: Configuration,
    /// Server of every client.
    servers: Vec<usize>,
    /// Memoized delays.
    delays: Option<Vec<f64>>,
}

impl SingleAssociationEngine {
    /// Fails unless every client has exactly one eligible server.
    pub fn new(config: Configuration) -> anyhow::Result<Self> {
        let servers = (0..config.nclients())
            .map(|i| match config.eligible_servers(i).as_slice() {
                [server] => Ok(*server),
                other => Err(ConfigError::wrong_eligible_count(format!(
                    "client {i} has {} eligible servers, expected 1",
                    other.len()
                ))),
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { config, servers, delays: None })
    }

    /// The server of every client.
    pub fn servers(&self) -> &[usize] {
        &self.servers
    }

    /// Per-client M/M/1 delays.
    fn compute(&self) -> Vec<f64> {
        let mut loads = vec![0.0; self.config.nservers()];
        for (&server, load) in self.servers.iter().zip(self.config.load()) {
            loads[server] += load;
        }

        self.servers
            .iter()
            .enumerate()
            .map(|(i, &server)| {
                let mu = self.config.mu()[server];
                if mu <= loads[server] {
                    UNSTABLE
                } else {
                    self.config.tau()[i][server] + (self.config.x()[i] * mu) / (mu - loads[server])
                }
            })
            .collect()
    }
}

impl SteadyState for SingleAssociationEngine {
    fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    fn steady_state_delays(&mut self) -> anyhow::Result<&[f64]> {
        let delays = match self.delays.take() {
            Some(delays) => delays,
            None => self.compute(),
        };
        Ok(self.delays.insert(delays).as_slice())
    }

    fn clear(&mut self) {
        self.delays = None;
    }

    fn debug_print(&mut self, out: &mut dyn Write, with_delays: bool, fmt: ValueFormatter) -> EmptyResult {
        let association: Vec<Vec<u8>> = self
            .config
            .association()
            .iter()
            .map(|row| row.iter().map(|&a| u8::from(a)).collect())
            .collect();

        write_table(out, "Network delays", self.config.tau(), fmt)?;
        write_row(out, "Requests", self.config.x(), fmt)?;
        write_row(out, "Request rates", self.config.load(), fmt)?;
        write_row(out, "Server rates", self.config.mu(), fmt)?;
        write_table(out, "Associations", &association, &|v: u8| v.to_string())?;
        write_row(out, "Possible servers", &self.servers, &|v: usize| v.to_string())?;

        if with_delays {
            write_row(out, "Steady state average delays", self.steady_state_delays()?, fmt)?;
        }
        Ok(())
    }
}
