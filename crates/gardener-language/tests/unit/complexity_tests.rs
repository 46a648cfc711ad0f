use gardener_domain::entities::Language;
use gardener_language::SourceParser;
use gardener_language::complexity;

fn analyze_python(source: &str) -> complexity::ComplexityMetrics {
    let tree = SourceParser::new()
        .parse(source, Language::Python)
        .expect("parse");
    complexity::analyze(tree.root_node(), Language::Python)
}

#[test]
fn test_flat_code_scores_low() {
    let metrics = analyze_python("x = 1\ny = 2\n");
    assert_eq!(metrics.branches, 0);
    assert_eq!(metrics.loops, 0);
    assert_eq!(metrics.score(2), 0);
}

#[test]
fn test_branches_and_loops_counted() {
    let source = r#"def f(items):
    total = 0
    for item in items:
        if item > 0:
            total += item
        else:
            total -= item
    while total > 100:
        total //= 2
    return total
"#;
    let metrics = analyze_python(source);
    assert_eq!(metrics.loops, 2);
    assert!(metrics.branches >= 2, "if and else both count");
    assert!(metrics.max_nesting >= 3, "if inside for inside def body");
}

#[test]
fn test_nesting_tracks_depth_not_count() {
    let flat = analyze_python("if a:\n    x = 1\nif b:\n    y = 2\nif c:\n    z = 3\n");
    let nested = analyze_python("if a:\n    if b:\n        if c:\n            x = 1\n");
    assert!(nested.max_nesting > flat.max_nesting);
    assert_eq!(flat.branches, nested.branches);
}

#[test]
fn test_score_adds_size_weight() {
    let metrics = complexity::ComplexityMetrics::default();
    assert_eq!(metrics.score(9), 0);
    assert_eq!(metrics.score(50), 5);
}

#[test]
fn test_javascript_switch_cases() {
    let source = r#"function route(kind) {
  switch (kind) {
    case "a":
      return 1;
    case "b":
      return 2;
    default:
      return 0;
  }
}
"#;
    let tree = SourceParser::new()
        .parse(source, Language::JavaScript)
        .expect("parse");
    let metrics = complexity::analyze(tree.root_node(), Language::JavaScript);
    assert!(metrics.branches >= 2, "switch cases count as branches");
}
