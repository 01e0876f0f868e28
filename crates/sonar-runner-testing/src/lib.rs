//! Testing infrastructure for sonar-runner integration tests.
//!
//! - `TestWorld`: isolated project trees, fake engines and CLI execution
//! - `FakeServer`: loopback HTTP responder standing in for the analysis server
//! - `assertions`: checks on captured runner output

pub mod assertions;
pub mod server;
pub mod world;

pub use server::FakeServer;
pub use world::{CliResult, TestWorld};
