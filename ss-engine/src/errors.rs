//! Failures of the steady-state pipeline.  Input validation errors live in
//! [`ss_core::config::ConfigError`].
use ss_core::err_impl;
use ss_core::errors::*;

err_impl! {
    /// Errors raised while analysing a valid configuration.
    SteadyStateError,
    /// Some states have no outflow; carries every such state in ascending order.
    #[error("degenerate chain, states without any reachable destination: {0:?}")]
    DegenerateChain(Vec<usize>),

    /// The absorbing-state fallback found nothing to report; carries the state count.
    #[error("degenerate chain but none of the {0} states is absorbing")]
    NoAbsorbingState(usize),

    /// The `2^nclients` state space would be too large; carries the client count.
    #[error("{0} clients exceed the supported state-space size")]
    TooManyClients(usize),
}

/// True if `err` reports a chain with zero-outflow states, which the engine and the runner treat
/// as recoverable.
pub fn is_degenerate(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<SteadyStateError>(), Some(SteadyStateError::DegenerateChain(_)))
}

/// The zero-outflow states carried by a degeneracy error, if `err` is one.
pub fn degenerate_states(err: &anyhow::Error) -> Option<&[usize]> {
    match err.downcast_ref::<SteadyStateError>() {
        Some(SteadyStateError::DegenerateChain(states)) => Some(states),
        _ => None,
    }
}
