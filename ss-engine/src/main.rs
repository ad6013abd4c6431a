#![deny(
    // Quality seal: code that trips these gets an inline allow, which marks it for a second look.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]

//! Batch driver: generates (or loads) configurations, computes their steady-state delays over a
//! worker pool and writes one line of per-client delays per usable configuration.
//! See binary --help for more information
use std::path::PathBuf;

use anyhow::Result;
use clap::{
    Parser,
    ValueEnum,
};
use ss_core::errors::*;
use ss_core::Configuration;
use ss_engine::generate::{
    ConfigurationGenerator,
    GeneratorParams,
};
use ss_engine::utils::{
    load_configurations,
    write_absorbing_count,
    write_delays_file,
};
use ss_engine::{
    DegeneratePolicy,
    EngineOptions,
    ParallelRunner,
    SteadyStateEngine,
    TieBreak,
};
use tracing::{
    info,
    warn,
};

/// Steady-state delays of an edge computing system where each client probes a secondary server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    /// Single client-server association (cannot be used with --absorbing or --input)
    #[arg(long)]
    single: bool,

    /// Write the number of configurations with absorbing states instead of the delays (cannot be
    /// used with --single)
    #[arg(long)]
    absorbing: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,

    /// Random number generator seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Chi value, in (0,1)
    #[arg(long, default_value_t = 0.1)]
    chi: f64,

    /// Number of clients
    #[arg(long, default_value_t = 2)]
    clients: usize,

    /// Number of servers
    #[arg(long, default_value_t = 2)]
    servers: usize,

    /// Minimum serving rate, in 1/s
    #[arg(long, default_value_t = 1.0)]
    mu_min: f64,

    /// Maximum serving rate, in 1/s
    #[arg(long, default_value_t = 1.0)]
    mu_max: f64,

    /// Minimum load, in 1/s
    #[arg(long, default_value_t = 0.1)]
    load_min: f64,

    /// Maximum load, in 1/s
    #[arg(long, default_value_t = 0.3)]
    load_max: f64,

    /// Number of replications
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Number of replications to be skipped
    #[arg(long, default_value_t = 0)]
    skip_runs: usize,

    /// Output file
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Number of worker threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// How clients decide when serving and probing delays are equal
    #[arg(long, value_enum, default_value_t = TieBreakArg::Remain)]
    tie_break: TieBreakArg,

    /// Skip configurations whose chain has absorbing states instead of reporting the delays of
    /// the absorbing state
    #[arg(long)]
    skip_degenerate: bool,

    /// JSON or YAML file with the configurations to analyse; replaces random generation, and the
    /// engine follows the association matrix of each configuration
    #[arg(short, long)]
    input: Option<PathBuf>,
}

/// Command-line spelling of [`TieBreak`].
#[derive(Clone, Copy, ValueEnum)]
enum TieBreakArg {
    /// Ties keep the primary server.
    Remain,
    /// Ties allow a switch.
    Leave,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Remain => TieBreak::Remain,
            TieBreakArg::Leave => TieBreak::Leave,
        }
    }
}

impl Cli {
    /// Reject contradictory flags.
    fn validate(&self) -> EmptyResult {
        ensure!(self.threads >= 1, "at least one thread is required");
        ensure!(!(self.single && self.absorbing), "--single cannot be used with --absorbing");
        // loaded configurations carry their own association matrix
        ensure!(!(self.single && self.input.is_some()), "--single cannot be used with --input");
        Ok(())
    }

    /// Engine options selected by the flags.
    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            tie_break: self.tie_break.into(),
            on_degenerate: if self.skip_degenerate { DegeneratePolicy::Reject } else { DegeneratePolicy::Fallback },
            ..Default::default()
        }
    }

    /// The loaded or generated configurations, skipped runs removed.
    fn configurations(&self) -> Result<Vec<Configuration>> {
        if let Some(path) = &self.input {
            let configurations = load_configurations(path)?;
            return Ok(configurations.into_iter().skip(self.skip_runs).collect());
        }

        let params = GeneratorParams {
            chi: self.chi,
            clients: self.clients,
            servers: self.servers,
            mu_min: self.mu_min,
            mu_max: self.mu_max,
            load_min: self.load_min,
            load_max: self.load_max,
            servers_per_client: if self.single { 1 } else { 2 },
        };
        ConfigurationGenerator::new(params, self.seed)?.generate(self.runs, self.skip_runs)
    }
}

/// Count the configurations with at least one absorbing state.
fn count_absorbing(configurations: Vec<Configuration>, options: EngineOptions) -> Result<usize> {
    let mut count = 0;
    for (run, config) in configurations.into_iter().enumerate() {
        let mut engine = SteadyStateEngine::with_options(config, options)?;
        let absorbing = engine.absorbing();
        if absorbing.len() > 1 {
            warn!(run, ?absorbing, "more than one absorbing state");
        }
        if !absorbing.is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Entry point.
fn main() -> Result<()> {
    let args = Cli::parse();

    ss_core::logging::setup(&args.verbosity)?;
    args.validate()?;

    let configurations = args.configurations()?;
    info!(count = configurations.len(), "starting analysis");

    if args.absorbing {
        let count = count_absorbing(configurations, args.engine_options())?;
        write_absorbing_count(&args.output, count)?;
    } else {
        let runner = ParallelRunner::new(args.threads)?
            .with_options(args.engine_options())
            .with_progress(args.progress);
        let results = runner.run(&configurations)?;
        write_delays_file(&args.output, &results)?;
    }
    Ok(())
}
