//! Unit tests.
mod config_test;
mod errors_test;
mod logging_test;
