//! Unit test suite for gardener-infrastructure
//!
//! Run with: `cargo test -p gardener-infrastructure --test unit`

mod analysis_tests;
mod capabilities_tests;
mod config_tests;
mod context_tests;
mod discovery_tests;
mod training_tests;
