//! Random configurations for batch experiments: no network delay, unit request sizes, uniformly
//! drawn service and arrival rates, and a random choice of eligible servers per client.
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{
    Rng,
    SeedableRng,
};
use ss_core::errors::*;
use ss_core::Configuration;
use tracing::{
    debug,
    instrument,
};

/// Shape and value ranges of generated configurations.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorParams {
    /// Probing discount shared by every configuration.
    pub chi: f64,
    /// Clients per configuration.
    pub clients: usize,
    /// Servers per configuration.
    pub servers: usize,
    /// Lower bound of the service rates.
    pub mu_min: f64,
    /// Upper bound of the service rates.
    pub mu_max: f64,
    /// Lower bound of the arrival rates.
    pub load_min: f64,
    /// Upper bound of the arrival rates.
    pub load_max: f64,
    /// 2 for the dual-option model, 1 for the single-option one.
    pub servers_per_client: usize,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            chi: 0.1,
            clients: 2,
            servers: 2,
            mu_min: 1.0,
            mu_max: 1.0,
            load_min: 0.1,
            load_max: 0.3,
            servers_per_client: 2,
        }
    }
}

impl GeneratorParams {
    /// Check that the parameters can produce valid configurations.
    pub fn validate(&self) -> EmptyResult {
        ensure!(self.clients >= 1, "at least one client is required");
        ensure!(self.servers >= 1, "at least one server is required");
        ensure!(self.mu_max >= self.mu_min, "mu_max must not be smaller than mu_min");
        ensure!(self.load_max >= self.load_min, "load_max must not be smaller than load_min");
        ensure!(
            (1..=2).contains(&self.servers_per_client),
            "clients are associated with one or two servers, not {}",
            self.servers_per_client
        );
        ensure!(
            self.servers >= self.servers_per_client,
            "{} servers cannot give every client {} distinct eligible servers",
            self.servers,
            self.servers_per_client
        );
        Ok(())
    }
}

/// Seeded source of random configurations.
pub struct ConfigurationGenerator {
    /// Validated parameters.
    params: GeneratorParams,
    /// Random source, seeded once.
    rng: StdRng,
}

impl ConfigurationGenerator {
    /// Generator drawing from `seed`; fails on invalid parameters.
    pub fn new(params: GeneratorParams, seed: u64) -> anyhow::Result<Self> {
        params.validate()?;
        Ok(Self { params, rng: StdRng::seed_from_u64(seed) })
    }

    /// Draw one configuration.
    pub fn next_configuration(&mut self) -> anyhow::Result<Configuration> {
        let p = &self.params;
        let mu: Vec<f64> = (0..p.servers).map(|_| self.rng.gen_range(p.mu_min..=p.mu_max)).collect();
        let load: Vec<f64> = (0..p.clients).map(|_| self.rng.gen_range(p.load_min..=p.load_max)).collect();

        let mut association = vec![vec![false; p.servers]; p.clients];
        for row in &mut association {
            for server in index::sample(&mut self.rng, p.servers, p.servers_per_client).into_iter() {
                row[server] = true;
            }
        }

        Configuration::new(p.chi, vec![vec![0.0; p.servers]; p.clients], vec![1.0; p.clients], load, mu, association)
    }

    /// Draw `runs` configurations and drop the first `skip_runs` of them.  Skipped runs still
    /// consume random numbers, so run `n` is the same whatever the skip count.
    #[instrument(skip(self))]
    pub fn generate(&mut self, runs: usize, skip_runs: usize) -> anyhow::Result<Vec<Configuration>> {
        let mut configurations = Vec::with_capacity(runs.saturating_sub(skip_runs));
        for n in 0..runs {
            let config = self.next_configuration()?;
            if n < skip_runs {
                debug!(run = n, "skipped run");
                continue;
            }
            configurations.push(config);
        }
        Ok(configurations)
    }
}
