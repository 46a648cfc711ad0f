//! # Infrastructure Layer
//!
//! Everything between the domain and the binary: configuration,
//! logging, durable persistence, the capability registry, the adapter
//! and context caches, the trainer, and the analysis controller that
//! composes them.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`config`] | Settings, loader, data-root layout |
//! | [`capabilities`] | Runtime capability detection with stand-ins |
//! | [`registry`] | Durable project catalog |
//! | [`context`] | Per-project conversation contexts (LRU) |
//! | [`adapters`] | Adapter cache under a hard memory budget |
//! | [`training`] | Background training jobs |
//! | [`services`] | Discovery, ingestion, controller, export |
//! | [`runtime`] | One value wiring it all together |

/// Dynamic adapter loader
pub mod adapters;
/// Component registry
pub mod capabilities;
/// Configuration
pub mod config;
/// Project context manager
pub mod context;
/// Logging setup
pub mod logging;
/// Project registry
pub mod registry;
/// Runtime wiring
pub mod runtime;
/// Services
pub mod services;
/// Adapter trainer
pub mod training;

pub use adapters::AdapterLoader;
pub use capabilities::CapabilityRegistry;
pub use config::{ConfigLoader, DataRoot, Settings};
pub use context::ContextManager;
pub use registry::ProjectRegistry;
pub use runtime::Runtime;
pub use services::{AnalysisController, AnalysisMode};
pub use training::Trainer;
