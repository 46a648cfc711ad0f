//! Tree-sitter parsing
//!
//! One thin wrapper around `tree_sitter::Parser` with a grammar per
//! supported language. Parsers are cheap to construct and not `Sync`,
//! so `SourceParser` builds one per parse call.

use gardener_domain::entities::Language;
use tree_sitter::Tree;

use crate::error::{ParseError, Result};

/// Parser facade over the bundled tree-sitter grammars
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceParser;

impl SourceParser {
    /// Create a parser facade.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Languages a grammar is bundled for.
    #[must_use]
    pub fn supported_languages() -> &'static [Language] {
        &[Language::Python, Language::JavaScript, Language::TypeScript]
    }

    /// Whether `language` can be parsed semantically.
    #[must_use]
    pub fn supports(language: Language) -> bool {
        Self::supported_languages().contains(&language)
    }

    /// Parse source text into a syntax tree.
    ///
    /// # Errors
    ///
    /// Fails for unsupported languages, grammar load failures, and trees
    /// containing syntax errors. Files that fail here are reported with an
    /// error marker and skipped for chunking; ingestion continues.
    pub fn parse(&self, content: &str, language: Language) -> Result<Tree> {
        let grammar = match language {
            Language::Python => tree_sitter_python::LANGUAGE,
            Language::JavaScript => tree_sitter_javascript::LANGUAGE,
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
            Language::Unknown => return Err(ParseError::UnsupportedLanguage(language)),
        };

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar.into())
            .map_err(|e| ParseError::GrammarLoad(e.to_string()))?;

        let tree = parser.parse(content, None).ok_or(ParseError::NoTree)?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax {
                line: first_error_line(root),
            });
        }
        Ok(tree)
    }
}

/// Line of the first error or missing node under `node`, 1-indexed.
fn first_error_line(node: tree_sitter::Node<'_>) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.has_error() {
                return first_error_line(child);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    node.start_position().row + 1
}
