use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::errors::*;

/// Install the crate-standard `tracing` subscriber.  `env_filter` takes the usual
/// `RUST_LOG`-style directives, e.g. `info` or `ss_engine=debug,warn`.
///
/// Fails on malformed directives, or when another global subscriber is already installed.
pub fn setup(env_filter: &str) -> EmptyResult {
    setup_with_spans(env_filter, FmtSpan::NONE)
}

/// Like [`setup`], but also emits span open/close events (useful to time the solver stages).
pub fn setup_with_spans(env_filter: &str, spans: FmtSpan) -> EmptyResult {
    let filter = parse_filter(env_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(spans)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("could not install the log subscriber: {err}"))
}

/// Parse `env_filter` without installing anything.
pub fn parse_filter(env_filter: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(env_filter).map_err(|err| anyhow!("invalid log filter {env_filter:?}: {err}"))
}
