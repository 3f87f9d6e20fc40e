//! Test suites for the server crate.

mod behaviour;
