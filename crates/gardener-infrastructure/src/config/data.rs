//! Configuration data model
//!
//! Every knob has a serde default, so an empty config file (or none at
//! all) yields a working local-first setup: Ollama endpoints on
//! localhost, the file-backed vector store, and the null adapter runtime.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default data root directory name under the user's home
pub const DATA_ROOT_DIR_NAME: &str = ".codebase-gardener";

/// Top-level application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Per-user data root; `~/.codebase-gardener` when unset
    pub data_root: Option<PathBuf>,
    /// Log filter, e.g. "info" or "gardener=debug"
    pub log_level: Option<String>,
    /// Verbose diagnostics
    pub debug: bool,
    /// Capabilities forced off regardless of detection
    pub disabled_capabilities: Vec<String>,
    /// LLM endpoint settings
    pub llm: LlmSettings,
    /// Embedding generator settings
    pub embedding: EmbeddingSettings,
    /// Vector store settings
    pub vector_store: VectorStoreSettings,
    /// Adapter runtime and loader settings
    pub adapters: AdapterSettings,
    /// Conversation context settings
    pub context: ContextSettings,
    /// Retrieval settings
    pub retrieval: RetrievalSettings,
    /// Chunking size window
    pub chunking: ChunkingSettings,
    /// File discovery settings
    pub discovery: DiscoverySettings,
}

/// LLM endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name in the LLM registry
    pub provider: String,
    /// Endpoint host
    pub host: String,
    /// Default model name
    pub model: String,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Overall request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_owned(),
            host: "http://localhost:11434".to_owned(),
            model: "llama3.2".to_owned(),
            connect_timeout_secs: 5,
            request_timeout_secs: 120,
        }
    }
}

/// Embedding generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name in the embedding registry
    pub provider: String,
    /// Model name for HTTP providers
    pub model: Option<String>,
    /// Vector width override
    pub dimensions: Option<usize>,
    /// Byte budget for one embedding batch
    pub batch_bytes: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_owned(),
            model: None,
            dimensions: None,
            batch_bytes: 1024 * 1024,
        }
    }
}

/// Vector store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Provider name in the vector store registry
    pub provider: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "local".to_owned(),
        }
    }
}

/// Adapter runtime and loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    /// Runtime name in the adapter runtime registry
    pub runtime: String,
    /// Base model id adapters specialize
    pub base_model: String,
    /// Hard memory ceiling for cached adapters, in bytes
    pub max_memory_bytes: u64,
    /// Maximum number of cached adapters
    pub max_cached: usize,
    /// Progress callback cadence during training, in steps
    pub progress_every: u64,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            runtime: "null".to_owned(),
            base_model: "llama3.2".to_owned(),
            // 4.5 GiB leaves headroom on an 8 GiB machine
            max_memory_bytes: 4_831_838_208,
            max_cached: 8,
            progress_every: 10,
        }
    }
}

/// Conversation context settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Retained message cap per project
    pub max_messages: usize,
    /// In-memory project context cap
    pub max_in_memory: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_messages: 200,
            max_in_memory: 8,
        }
    }
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Chunks retrieved per question
    pub top_k: usize,
    /// Similarity floor; hits below it are dropped. Cosine scores live in
    /// `[-1, 1]`, so `-1.0` disables the floor.
    pub min_score: f32,
    /// Conversation turns included in the prompt
    pub history_turns: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: -1.0,
            history_turns: 5,
        }
    }
}

/// Chunking size window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Minimum chunk size in characters
    pub min_chars: usize,
    /// Maximum chunk size in characters
    pub max_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            min_chars: 64,
            max_chars: 2048,
        }
    }
}

/// File discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Additional directory names to exclude during traversal
    pub exclude_dirs: Vec<String>,
    /// Progress callback cadence, in files
    pub progress_every: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            exclude_dirs: Vec::new(),
            progress_every: 50,
        }
    }
}
