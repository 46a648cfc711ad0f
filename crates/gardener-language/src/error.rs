//! Parsing and chunking errors
//!
//! Local error type; the ingest pipeline maps these into per-file
//! `Ingest` errors in the domain taxonomy.

use gardener_domain::entities::Language;
use thiserror::Error;

/// Result alias for parsing and chunking operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors produced while parsing or chunking a single file
#[derive(Error, Debug)]
pub enum ParseError {
    /// The language has no registered grammar
    #[error("no grammar for language '{0}'")]
    UnsupportedLanguage(Language),

    /// Loading a tree-sitter grammar failed
    #[error("failed to load grammar: {0}")]
    GrammarLoad(String),

    /// The parser produced no tree
    #[error("parser produced no tree")]
    NoTree,

    /// The source contains syntax errors the parser could not recover from
    #[error("syntax error near line {line}")]
    Syntax {
        /// 1-indexed line of the first error node
        line: usize,
    },
}
