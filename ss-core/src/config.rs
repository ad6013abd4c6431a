//! The immutable input of one steady-state analysis.
//!
//! A [`Configuration`] can only be obtained through [`Configuration::new`] (or by deserializing,
//! which goes through the same checks), so downstream code may rely on every shape invariant
//! without re-checking it.  The in-place mutators hand out fixed-length slices; they can change
//! values but never shapes.
use serde::{
    Deserialize,
    Serialize,
};

use crate::err_impl;
use crate::errors::*;

err_impl! {ConfigError,
    #[error("chi must lie in the open interval (0, 1), got {0}")]
    ChiOutOfRange(f64),

    #[error("malformed configuration shape: {0}")]
    InvalidShape(String),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("wrong number of eligible servers: {0}")]
    WrongEligibleCount(String),
}

/// Input values of a single analysis: `nclients x nservers` network delays and associations,
/// per-client request sizes and arrival rates, and per-server service rates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    chi: f64,
    tau: Vec<Vec<f64>>,
    x: Vec<f64>,
    load: Vec<f64>,
    mu: Vec<f64>,
    association: Vec<Vec<bool>>,
}

impl Configuration {
    pub fn new(
        chi: f64,
        tau: Vec<Vec<f64>>,
        x: Vec<f64>,
        load: Vec<f64>,
        mu: Vec<f64>,
        association: Vec<Vec<bool>>,
    ) -> anyhow::Result<Self> {
        let config = Self { chi, tau, x, load, mu, association };
        config.validate()?;
        Ok(config)
    }

    pub fn chi(&self) -> f64 {
        self.chi
    }

    pub fn tau(&self) -> &[Vec<f64>] {
        &self.tau
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn load(&self) -> &[f64] {
        &self.load
    }

    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    pub fn association(&self) -> &[Vec<bool>] {
        &self.association
    }

    pub fn nclients(&self) -> usize {
        self.tau.len()
    }

    pub fn nservers(&self) -> usize {
        self.mu.len()
    }

    /// Servers client `client` may be associated with, in ascending index order.
    pub fn eligible_servers(&self, client: usize) -> Vec<usize> {
        self.association[client]
            .iter()
            .enumerate()
            .filter_map(|(server, &eligible)| eligible.then_some(server))
            .collect()
    }

    pub fn set_chi(&mut self, chi: f64) -> EmptyResult {
        check_chi(chi)?;
        self.chi = chi;
        Ok(())
    }

    pub fn mu_mut(&mut self) -> &mut [f64] {
        &mut self.mu
    }

    pub fn load_mut(&mut self) -> &mut [f64] {
        &mut self.load
    }

    pub fn x_mut(&mut self) -> &mut [f64] {
        &mut self.x
    }

    /// Network delays from `client` to every server.
    pub fn tau_mut(&mut self, client: usize) -> &mut [f64] {
        &mut self.tau[client]
    }

    fn validate(&self) -> EmptyResult {
        check_chi(self.chi)?;

        let nclients = self.tau.len();
        if nclients == 0 {
            return Err(ConfigError::invalid_shape("at least one client is required"));
        }
        let nservers = self.mu.len();
        if nservers == 0 {
            return Err(ConfigError::invalid_shape("at least one server is required"));
        }

        for (i, row) in self.tau.iter().enumerate() {
            check_len(&format!("tau[{i}]"), row.len(), nservers)?;
        }
        check_len("x", self.x.len(), nclients)?;
        check_len("load", self.load.len(), nclients)?;
        check_len("association", self.association.len(), nclients)?;
        for (i, row) in self.association.iter().enumerate() {
            check_len(&format!("association[{i}]"), row.len(), nservers)?;
        }

        check_values("tau", self.tau.iter().flatten(), |v| v >= 0.0)?;
        check_values("x", self.x.iter(), |v| v >= 0.0)?;
        check_values("load", self.load.iter(), |v| v >= 0.0)?;
        check_values("mu", self.mu.iter(), |v| v > 0.0)?;
        Ok(())
    }
}

fn check_chi(chi: f64) -> EmptyResult {
    if chi > 0.0 && chi < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::chi_out_of_range(chi))
    }
}

fn check_len(name: &str, got: usize, expected: usize) -> EmptyResult {
    if got != expected {
        return Err(ConfigError::invalid_shape(format!("{name} has length {got}, expected {expected}")));
    }
    Ok(())
}

fn check_values<'a>(name: &str, values: impl Iterator<Item = &'a f64>, accept: impl Fn(f64) -> bool) -> EmptyResult {
    for (ndx, &v) in values.enumerate() {
        if !v.is_finite() || !accept(v) {
            return Err(ConfigError::invalid_value(format!("{name} entry #{ndx} is out of range: {v}")));
        }
    }
    Ok(())
}

/// Association entries may be written as booleans or as 0/1 integers.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
enum AssociationFlag {
    Bool(bool),
    Int(u8),
}

impl TryFrom<AssociationFlag> for bool {
    type Error = anyhow::Error;

    fn try_from(flag: AssociationFlag) -> anyhow::Result<bool> {
        match flag {
            AssociationFlag::Bool(b) => Ok(b),
            AssociationFlag::Int(0) => Ok(false),
            AssociationFlag::Int(1) => Ok(true),
            AssociationFlag::Int(n) => Err(ConfigError::invalid_value(format!("association flag must be 0 or 1, got {n}"))),
        }
    }
}

#[derive(Deserialize)]
struct RawConfiguration {
    chi: f64,
    tau: Vec<Vec<f64>>,
    x: Vec<f64>,
    load: Vec<f64>,
    mu: Vec<f64>,
    association: Vec<Vec<AssociationFlag>>,
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfiguration) -> anyhow::Result<Self> {
        let association = raw
            .association
            .into_iter()
            .map(|row| row.into_iter().map(bool::try_from).collect::<anyhow::Result<Vec<_>>>())
            .collect::<anyhow::Result<Vec<_>>>()?;
        Configuration::new(raw.chi, raw.tau, raw.x, raw.load, raw.mu, association)
    }
}
