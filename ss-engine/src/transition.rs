//! Construction of the normalised generator matrix `Q`.
//!
//! From state `k`, every client that remains keeps its current choice while every client that may
//! leave can end up at either of its servers.  The destinations of `k` are therefore all states
//! that agree with `k` on the choice bits of the remaining clients, `k` itself excluded.  Each
//! destination gets the same rate `1 / |destinations|` and the diagonal holds `-1`, so that every
//! row sums to zero.
use tracing::{
    debug,
    instrument,
};

use crate::delay::DelayTable;
use crate::errors::SteadyStateError;
use crate::policy::{
    Decision,
    SwitchPolicy,
};
use crate::sparse::{
    CsrBuilder,
    CsrMatrix,
};
use crate::state_space::StateSpace;

/// Rate stored on the diagonal of every generator row.
pub const DIAGONAL: f64 = -1.0;

/// States reachable from `state` in one transition, in ascending order.
pub fn reachable_states(space: &StateSpace, decisions: &[Decision], state: usize) -> Vec<usize> {
    let free = decisions
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == Decision::Leave)
        .fold(0usize, |mask, (i, _)| mask | space.choice_mask(i));
    let fixed = state & !free;

    // walk every subset of the free bits, from `free` down to the empty set
    let mut dests = Vec::with_capacity((1usize << free.count_ones()).saturating_sub(1));
    let mut subset = free;
    loop {
        let dest = fixed | subset;
        if dest != state {
            dests.push(dest);
        }
        if subset == 0 {
            break;
        }
        subset = (subset - 1) & free;
    }
    dests.reverse();
    dests
}

/// Build the generator over `space`.  Fails with [`SteadyStateError::DegenerateChain`] listing
/// every state without a destination; the chain is expected to be ergodic, so no self-loop is
/// ever substituted for a missing outflow.
#[instrument(skip_all, fields(nstates = space.nstates()))]
pub fn build_generator(
    space: &StateSpace,
    delta: &DelayTable,
    deltabar: &DelayTable,
    policy: &SwitchPolicy,
) -> anyhow::Result<CsrMatrix> {
    let nstates = space.nstates();
    let mut builder = CsrBuilder::new(nstates);
    let mut absorbing = Vec::new();

    for k in 0..nstates {
        let decisions = policy.decisions(delta, deltabar, k);
        let dests = reachable_states(space, &decisions, k);
        if dests.is_empty() {
            absorbing.push(k);
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let rate = 1.0 / dests.len() as f64;
        builder.push_row(dests.into_iter().map(|h| (h, rate)).chain(std::iter::once((k, DIAGONAL))));
    }

    if !absorbing.is_empty() {
        return Err(SteadyStateError::degenerate_chain(absorbing));
    }

    let q = builder.finish();
    debug!(nnz = q.nnz(), "generator built");
    Ok(q)
}
