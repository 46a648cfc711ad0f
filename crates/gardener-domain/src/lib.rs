//! # Domain Layer
//!
//! Core types and contracts for Codebase Gardener: the entities that flow
//! through discovery, chunking, embedding, retrieval, and training; the
//! error taxonomy; the provider ports; and the linkme registries that
//! providers self-register into.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`entities`] | Projects, chunks, conversations, adapters, reports |
//! | [`ports`] | Provider port interfaces and capability handles |
//! | [`registry`] | Provider auto-registration registries |
//! | [`error`] | The error taxonomy shared by every crate |
//!
//! Aside from the durable-write helpers in [`utils`], the domain does no
//! I/O of its own: persistence, HTTP, and parsing live behind the ports
//! and in the infrastructure crates.

/// Common macros
#[macro_use]
pub mod macros;

/// Core business entities
pub mod entities;
/// Domain error types
pub mod error;
/// Provider port interfaces and capability handles
pub mod ports;
/// Provider auto-registration registries
pub mod registry;
/// Common utilities
pub mod utils;

pub use entities::*;
pub use error::{Error, Result};
pub use ports::{Capability, Embedding};
