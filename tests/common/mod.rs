//! Shared test utilities for docsis-watch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Fakes bind to 127.0.0.1 on a random port so harnesses
//! can run in parallel.

pub mod builders;
pub mod fake_modem_api;
pub mod fake_source;
pub mod fixtures;

pub use builders::*;
pub use fake_source::*;
pub use fixtures::*;
