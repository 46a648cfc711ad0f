//! Configuration
//!
//! Settings data model, layered loader, and the data-root layout.

/// Configuration data model
pub mod data;
/// Layered settings loader
pub mod loader;
/// Data root layout
pub mod paths;

pub use data::{
    AdapterSettings, ChunkingSettings, ContextSettings, DiscoverySettings, EmbeddingSettings,
    LlmSettings, RetrievalSettings, Settings, VectorStoreSettings,
};
pub use loader::ConfigLoader;
pub use paths::DataRoot;
