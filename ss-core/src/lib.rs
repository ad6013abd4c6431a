//! Shared plumbing for the steady-state analysis crates: error declarations, logging setup and the
//! validated analysis [`Configuration`](config::Configuration).

pub mod config;
pub mod errors;
pub mod logging;

pub use config::Configuration;

#[cfg(test)]
mod tests;
