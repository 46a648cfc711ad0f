//! Adapter runtimes
//!
//! The training library is an external dependency. Only the `null`
//! runtime ships with the repository: it keeps the loader and trainer
//! code paths exercisable while reporting `CapabilityUnavailable` for
//! anything that would need real tensors.

/// Stand-in runtime for machines without a training library
pub mod null;

pub use null::{NoopAdapterHandle, NullAdapterRuntime};
