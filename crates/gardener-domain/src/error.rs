//! Error handling types
//!
//! One error enum for the whole system, organized by failure kind rather
//! than by origin. Optional subsystems fail with [`Error::CapabilityUnavailable`]
//! and are recoverable by degrading; everything else maps to a category the
//! CLI can translate into an exit code.

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Codebase Gardener
#[derive(Error, Debug)]
pub enum Error {
    /// Caller mistake: bad path, invalid project id, unknown command
    #[error("{message}")]
    User {
        /// Description of what the caller got wrong
        message: String,
    },

    /// An optional subsystem is missing; callers fall back to degraded mode
    #[error("capability '{capability}' unavailable: {reason}")]
    CapabilityUnavailable {
        /// Name of the missing capability
        capability: String,
        /// Why it is unavailable
        reason: String,
    },

    /// A memory or disk budget would be exceeded
    #[error("resource exhausted: {resource} (requested {requested} bytes, budget {budget} bytes)")]
    ResourceExhausted {
        /// The budgeted resource
        resource: String,
        /// Bytes the operation would need
        requested: u64,
        /// Configured ceiling in bytes
        budget: u64,
    },

    /// Durable write failed after retry; in-memory state is preserved
    #[error("persistence error: {message}")]
    Persistence {
        /// Description of the failed write
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The external LLM endpoint cannot be reached
    #[error("LLM unavailable: {message}")]
    LlmUnavailable {
        /// Actionable description for the user
        message: String,
    },

    /// The external LLM did not answer within the request timeout
    #[error("LLM request timed out after {elapsed_secs}s")]
    LlmTimeout {
        /// Seconds waited before giving up
        elapsed_secs: u64,
    },

    /// Per-file ingestion failure; never aborts the pipeline
    #[error("ingest error for {path}: {message}")]
    Ingest {
        /// File the failure applies to
        path: String,
        /// Parse or embedding failure description
        message: String,
    },

    /// A bug: an internal invariant no longer holds
    #[error("internal invariant violated: {message}")]
    InvariantViolated {
        /// Description of the broken invariant
        message: String,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Resource not found
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Embedding provider operation error
    #[error("embedding error: {message}")]
    Embedding {
        /// Description of the embedding failure
        message: String,
    },

    /// Vector store operation error
    #[error("vector store error: {message}")]
    VectorStore {
        /// Description of the vector store failure
        message: String,
    },
}

// Category constructors
impl Error {
    /// Create a user error
    pub fn user<S: Into<String>>(message: S) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Create a capability-unavailable error
    pub fn capability<C: Into<String>, R: Into<String>>(capability: C, reason: R) -> Self {
        Self::CapabilityUnavailable {
            capability: capability.into(),
            reason: reason.into(),
        }
    }

    /// Create a resource-exhausted error
    pub fn resource_exhausted<S: Into<String>>(resource: S, requested: u64, budget: u64) -> Self {
        Self::ResourceExhausted {
            resource: resource.into(),
            requested,
            budget,
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invariant-violation error
    pub fn invariant<S: Into<String>>(message: S) -> Self {
        Self::InvariantViolated {
            message: message.into(),
        }
    }
}

// Persistence error constructors
impl Error {
    /// Create a persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Create a persistence error with source
    pub fn persistence_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Pipeline error constructors
impl Error {
    /// Create an embedding provider error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a vector store error
    pub fn vector_store<S: Into<String>>(message: S) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    /// Create a per-file ingest error
    pub fn ingest<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Ingest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an LLM-unavailable error
    pub fn llm_unavailable<S: Into<String>>(message: S) -> Self {
        Self::LlmUnavailable {
            message: message.into(),
        }
    }
}

impl Error {
    /// Whether this error means an optional capability is missing.
    ///
    /// The analysis controller uses this to decide between degrading and
    /// failing the whole operation.
    #[must_use]
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable { .. })
    }

    /// Exit code category for the CLI: 1 for user errors, 2 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::User { .. } | Self::NotFound { .. } => 1,
            _ => 2,
        }
    }
}
