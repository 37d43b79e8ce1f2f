//! Test harness for nbacross integration tests
//!
//! Provides fixture loading, binary execution, and custom assertions
//! for testing end-to-end CLI behavior.

mod assertions;

pub use assertions::NbacrossAssertions;
pub use fixture::Fixture;
pub use runner::{
    nbacross, nbacross_in_dir, nbacross_with_env, nbacross_with_stdin, spawn_nbacross, RunResult,
};
