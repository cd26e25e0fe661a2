//! Test suites for the framelane server.

mod behaviour;
mod support;
