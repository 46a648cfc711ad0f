//! Structural complexity scoring
//!
//! Tree-sitter based scoring used to rank chunks during retrieval and
//! report hot spots: nesting depth plus branch count plus a size weight.

use gardener_domain::entities::Language;
use tree_sitter::Node;

/// Raw complexity counters for a syntax subtree
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityMetrics {
    /// Maximum nesting depth
    pub max_nesting: usize,
    /// Number of branches (if/elif/else/switch arms, ternaries)
    pub branches: usize,
    /// Number of loops
    pub loops: usize,
}

impl ComplexityMetrics {
    /// Collapse the counters into the chunk score:
    /// nesting depth + branch count + a line-count weight.
    #[must_use]
    pub fn score(&self, line_count: usize) -> u32 {
        let weight = line_count / 10;
        (self.max_nesting + self.branches + self.loops + weight) as u32
    }
}

/// Analyze a subtree.
#[must_use]
pub fn analyze(node: Node<'_>, language: Language) -> ComplexityMetrics {
    let mut metrics = ComplexityMetrics::default();
    analyze_recursive(node, language, 0, &mut metrics);
    metrics
}

fn analyze_recursive(
    node: Node<'_>,
    language: Language,
    depth: usize,
    metrics: &mut ComplexityMetrics,
) {
    if is_decision_point(node.kind(), language) {
        metrics.branches += 1;
    }
    if is_loop(node.kind(), language) {
        metrics.loops += 1;
    }

    let nested = is_nesting_node(node.kind(), language);
    let child_depth = if nested { depth + 1 } else { depth };
    if nested && child_depth > metrics.max_nesting {
        metrics.max_nesting = child_depth;
    }

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            analyze_recursive(cursor.node(), language, child_depth, metrics);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn is_decision_point(kind: &str, language: Language) -> bool {
    match language {
        Language::Python => matches!(
            kind,
            "if_statement"
                | "elif_clause"
                | "else_clause"
                | "conditional_expression"
                | "boolean_operator"
                | "except_clause"
        ),
        Language::JavaScript | Language::TypeScript => matches!(
            kind,
            "if_statement" | "else_clause" | "switch_case" | "ternary_expression" | "catch_clause"
        ),
        Language::Unknown => false,
    }
}

fn is_loop(kind: &str, language: Language) -> bool {
    match language {
        Language::Python => matches!(kind, "for_statement" | "while_statement"),
        Language::JavaScript | Language::TypeScript => matches!(
            kind,
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
        ),
        Language::Unknown => false,
    }
}

fn is_nesting_node(kind: &str, language: Language) -> bool {
    is_decision_point(kind, language)
        || is_loop(kind, language)
        || matches!(kind, "block" | "statement_block" | "suite" | "class_body")
}
