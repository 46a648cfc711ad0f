//! Symbol reference extraction
//!
//! Best-effort dependency lists for chunks: identifiers a subtree refers
//! to minus the ones it defines. The result is a ranked hint for
//! retrieval metadata, not a resolved symbol table.

use std::collections::BTreeSet;

use gardener_domain::entities::Language;
use tree_sitter::Node;

/// Cap on the dependency list carried by one chunk
const MAX_DEPENDENCIES: usize = 24;

/// Identifiers referenced by `node` but not defined within it.
#[must_use]
pub fn external_references(node: Node<'_>, source: &[u8], language: Language) -> Vec<String> {
    let mut referenced = BTreeSet::new();
    let mut defined = BTreeSet::new();
    collect(node, source, language, &mut referenced, &mut defined);

    referenced
        .into_iter()
        .filter(|name| !defined.contains(name))
        .take(MAX_DEPENDENCIES)
        .collect()
}

fn collect(
    node: Node<'_>,
    source: &[u8],
    language: Language,
    referenced: &mut BTreeSet<String>,
    defined: &mut BTreeSet<String>,
) {
    match node.kind() {
        "identifier" | "type_identifier" => {
            if let Ok(name) = node.utf8_text(source) {
                if is_defining_position(node, language) {
                    defined.insert(name.to_owned());
                } else {
                    referenced.insert(name.to_owned());
                }
            }
        }
        // Property accesses reference their object, not the property name.
        "property_identifier" => {}
        _ => {}
    }

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            collect(cursor.node(), source, language, referenced, defined);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

/// Whether an identifier node sits in a position that introduces a name.
fn is_defining_position(node: Node<'_>, language: Language) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    // Name field of a definition
    if parent
        .child_by_field_name("name")
        .is_some_and(|name| name.id() == node.id())
        && matches!(
            parent.kind(),
            "function_definition"
                | "class_definition"
                | "function_declaration"
                | "generator_function_declaration"
                | "class_declaration"
                | "interface_declaration"
                | "type_alias_declaration"
                | "enum_declaration"
                | "variable_declarator"
                | "method_definition"
        )
    {
        return true;
    }

    // Parameters and assignment targets
    match language {
        Language::Python => {
            if matches!(
                parent.kind(),
                "parameters" | "default_parameter" | "typed_parameter" | "typed_default_parameter"
            ) {
                return true;
            }
            if parent.kind() == "assignment"
                && parent
                    .child_by_field_name("left")
                    .is_some_and(|left| left.id() == node.id())
            {
                return true;
            }
            // `for x in ...` and `import x` / `from m import x`
            if parent.kind() == "for_statement"
                && parent
                    .child_by_field_name("left")
                    .is_some_and(|left| left.id() == node.id())
            {
                return true;
            }
            matches!(parent.kind(), "aliased_import" | "dotted_name")
                && parent.parent().is_some_and(|gp| {
                    matches!(gp.kind(), "import_statement" | "import_from_statement")
                })
        }
        Language::JavaScript | Language::TypeScript => {
            if matches!(parent.kind(), "formal_parameters" | "required_parameter") {
                return true;
            }
            if parent.kind() == "variable_declarator"
                && parent
                    .child_by_field_name("name")
                    .is_some_and(|name| name.id() == node.id())
            {
                return true;
            }
            matches!(
                parent.kind(),
                "import_specifier" | "namespace_import" | "import_clause"
            )
        }
        Language::Unknown => false,
    }
}
