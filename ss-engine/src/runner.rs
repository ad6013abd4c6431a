//! Bounded worker pool running one independent analysis per configuration.
//!
//! Workers claim the next unclaimed job index and record its outcome into a results vector
//! pre-sized to the job count.  Both happen under one lock, which is never held while a job is
//! being computed.  A degenerate job is logged and recorded as `None`; any other failure is a
//! precondition violation and aborts the whole run once the in-flight jobs are done.
use std::thread;
use std::time::Instant;

use indicatif::{
    ProgressBar,
    ProgressFinish,
    ProgressStyle,
};
use parking_lot::Mutex;
use ss_core::errors::*;
use ss_core::Configuration;
use tracing::{
    debug,
    enabled,
    info,
    instrument,
    trace,
    warn,
    Level,
    Span,
};

use crate::engine::{
    Engine,
    EngineOptions,
    SteadyState,
};
use crate::errors::{
    degenerate_states,
    is_degenerate,
};

/// Outcome of a run: `results[i]` holds the per-client delays of configuration `i`, or `None`
/// when that configuration was skipped.
pub type RunResults = Vec<Option<Vec<f64>>>;

/// Fixed-size pool analysing a batch of configurations.
#[derive(Clone, Debug)]
pub struct ParallelRunner {
    /// Upper bound on worker threads.
    workers: usize,
    /// Options of every engine.
    options: EngineOptions,
    /// Whether to draw a progress bar.
    progress: bool,
}

/// State shared by the workers of one run.
struct JobBoard {
    /// Index of the next unclaimed job.
    next: usize,
    /// Outcome per job, in input order.
    results: RunResults,
    /// First non-recoverable error; stops further claims.
    fatal: Option<anyhow::Error>,
}

impl Default for ParallelRunner {
    fn default() -> Self {
        Self { workers: 1, options: EngineOptions::default(), progress: false }
    }
}

impl ParallelRunner {
    /// Runner with `workers` threads and default options.
    pub fn new(workers: usize) -> anyhow::Result<Self> {
        ensure!(workers >= 1, "at least one worker thread is required");
        Ok(Self { workers, ..Default::default() })
    }

    /// Replace the engine options.
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Show a progress bar over completed jobs.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Upper bound on worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyse every configuration exactly once.  Result order matches input order.
    #[instrument(skip_all, fields(jobs = configurations.len(), workers = self.workers))]
    pub fn run(&self, configurations: &[Configuration]) -> anyhow::Result<RunResults> {
        let board = Mutex::new(JobBoard { next: 0, results: vec![None; configurations.len()], fatal: None });
        let pb = self.progress_bar(configurations.len())?;

        let nthreads = self.workers.min(configurations.len());
        let span = Span::current();
        thread::scope(|s| -> EmptyResult {
            for tid in 0..nthreads {
                let (board, pb, span) = (&board, &pb, &span);
                thread::Builder::new()
                    .name(format!("ss-worker-{tid}"))
                    .spawn_scoped(s, move || {
                        let _entered = span.enter();
                        self.work(tid, configurations, board, pb);
                    })?;
            }
            Ok(())
        })?;
        pb.finish_using_style();

        let board = board.into_inner();
        if let Some(err) = board.fatal {
            return Err(err);
        }
        let skipped = board.results.iter().filter(|r| r.is_none()).count();
        info!(skipped, "all jobs complete");
        Ok(board.results)
    }

    /// Worker loop: claim, analyse, record, until the board is drained or poisoned.
    fn work(&self, tid: usize, configurations: &[Configuration], board: &Mutex<JobBoard>, pb: &ProgressBar) {
        loop {
            let job = {
                let mut board = board.lock();
                if board.fatal.is_some() || board.next >= configurations.len() {
                    break;
                }
                board.next += 1;
                board.next - 1
            };

            let started = Instant::now();
            match analyse(job, &configurations[job], self.options) {
                Ok(delays) => {
                    debug!(tid, job, elapsed = ?started.elapsed(), "job complete");
                    board.lock().results[job] = Some(delays);
                },
                Err(err) if is_degenerate(&err) => {
                    let absorbing = degenerate_states(&err).unwrap_or_default();
                    warn!(job, ?absorbing, "skipped run, chain has absorbing states");
                },
                Err(err) => {
                    board.lock().fatal.get_or_insert(err);
                },
            }
            pb.inc(1);
        }
    }

    /// A visible bar over `jobs` when enabled, a hidden one otherwise.
    fn progress_bar(&self, jobs: usize) -> anyhow::Result<ProgressBar> {
        if !self.progress {
            return Ok(ProgressBar::hidden());
        }
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({percent}%) {msg}")?;
        Ok(ProgressBar::new(jobs as u64)
            .with_style(style)
            .with_message(format!("{} worker threads", self.workers))
            .with_finish(ProgressFinish::AndLeave))
    }
}

/// Run one job.  At trace level the full engine dump is logged first, one event per line.
fn analyse(job: usize, config: &Configuration, options: EngineOptions) -> anyhow::Result<Vec<f64>> {
    let mut engine = Engine::new(config.clone(), options)?;
    if enabled!(Level::TRACE) {
        let mut dump = Vec::new();
        engine.debug_print(&mut dump, true, &|v| format!("{v:.6}"))?;
        for line in String::from_utf8_lossy(&dump).lines() {
            trace!(job, "{line}");
        }
    }
    Ok(engine.steady_state_delays()?.to_vec())
}
