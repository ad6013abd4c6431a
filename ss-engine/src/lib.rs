#![deny(
    // Quality seal: code that trips these gets an inline allow, which marks it for a second look.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]

//! # ss-engine – steady-state delays of probing edge clients
//!
//! Every client in the modelled edge network is eligible for two servers: it is served by one of
//! them (its primary) while probing the other (its secondary), which reserves only a
//! `chi`-discounted share of capacity there.  Clients switch whenever probing looks faster than
//! being served.  This crate turns that switching behaviour into a continuous-time Markov chain
//! and reports the long-run average response delay of each client.
//!
//! ## Pipeline overview
//! 1. State enumeration ([`StateSpace`]) – one state per combination of primary/secondary
//!    choices, `2^nclients` in total.
//! 2. Delay estimation ([`DelayTable`]) – M/M/1 residual-capacity delays for every client and
//!    state, both when served and when probing.
//! 3. Switch decisions ([`SwitchPolicy`]) – whether a client remains at its primary or may leave.
//! 4. Generator construction ([`transition::build_generator`]) – a sparse, row-normalised
//!    generator over the states reachable under the switch decisions.
//! 5. Stationary distribution ([`stationary::solve`]) – uniformised power iteration.
//! 6. Aggregation ([`SteadyStateEngine`]) – delays weighted by the stationary distribution, with
//!    an absorbing-state fallback when the chain is degenerate.
//!
//! [`ParallelRunner`] fans many independent configurations out over a bounded pool of worker
//! threads.

pub mod delay;
pub mod engine;
pub mod errors;
pub mod generate;
pub mod policy;
pub mod runner;
pub mod sparse;
pub mod state_space;
pub mod stationary;
pub mod transition;
pub mod utils;

pub use delay::{
    DelayTable,
    Role,
    UNSTABLE,
};
pub use engine::{
    DegeneratePolicy,
    Engine,
    EngineOptions,
    SingleAssociationEngine,
    SteadyState,
    SteadyStateEngine,
};
pub use errors::SteadyStateError;
pub use policy::{
    Decision,
    SwitchPolicy,
    TieBreak,
};
pub use runner::ParallelRunner;
pub use sparse::CsrMatrix;
pub use state_space::StateSpace;
pub use stationary::{
    SolverOptions,
    StationaryDistribution,
};

#[cfg(test)]
mod tests;
