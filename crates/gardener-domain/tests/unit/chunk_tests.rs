use std::path::Path;

use gardener_domain::entities::{Chunk, ChunkKind, Language};

fn sample_chunk() -> Chunk {
    Chunk {
        id: Chunk::stable_id("proj-1", Path::new("src/main.py"), ChunkKind::Function, 10),
        project_id: "proj-1".to_owned(),
        file_path: "src/main.py".into(),
        language: Language::Python,
        kind: ChunkKind::Function,
        byte_start: 120,
        byte_end: 480,
        start_line: 10,
        end_line: 24,
        complexity: 7,
        dependencies: vec!["os".to_owned(), "load_config".to_owned()],
        text: "def main():\n    ...\n".to_owned(),
    }
}

#[test]
fn test_stable_id_deterministic() {
    let a = Chunk::stable_id("proj-1", Path::new("src/main.py"), ChunkKind::Function, 10);
    let b = Chunk::stable_id("proj-1", Path::new("src/main.py"), ChunkKind::Function, 10);
    assert_eq!(a, b);
    assert_eq!(a.len(), 32);
}

#[test]
fn test_stable_id_varies_by_inputs() {
    let base = Chunk::stable_id("proj-1", Path::new("src/main.py"), ChunkKind::Function, 10);
    assert_ne!(
        base,
        Chunk::stable_id("proj-2", Path::new("src/main.py"), ChunkKind::Function, 10)
    );
    assert_ne!(
        base,
        Chunk::stable_id("proj-1", Path::new("src/other.py"), ChunkKind::Function, 10)
    );
    assert_ne!(
        base,
        Chunk::stable_id("proj-1", Path::new("src/main.py"), ChunkKind::Class, 10)
    );
    assert_ne!(
        base,
        Chunk::stable_id("proj-1", Path::new("src/main.py"), ChunkKind::Function, 11)
    );
}

#[test]
fn test_stable_id_ignores_content() {
    let mut chunk = sample_chunk();
    let id_before = chunk.id.clone();
    chunk.text.push_str("# edited\n");
    let id_after = Chunk::stable_id(
        &chunk.project_id,
        &chunk.file_path,
        chunk.kind,
        chunk.start_line,
    );
    assert_eq!(id_before, id_after);
}

#[test]
fn test_validate_accepts_consistent_ranges() {
    assert!(sample_chunk().validate().is_ok());
}

#[test]
fn test_validate_rejects_empty_byte_range() {
    let mut chunk = sample_chunk();
    chunk.byte_end = chunk.byte_start;
    assert!(chunk.validate().is_err());
}

#[test]
fn test_validate_rejects_inverted_lines() {
    let mut chunk = sample_chunk();
    chunk.end_line = chunk.start_line - 1;
    assert!(chunk.validate().is_err());
}

#[test]
fn test_citation_format() {
    assert_eq!(sample_chunk().citation(), "src/main.py:10-24");
}

#[test]
fn test_chunk_kind_display() {
    assert_eq!(ChunkKind::Function.to_string(), "function");
    assert_eq!(ChunkKind::Class.to_string(), "class");
    assert_eq!(ChunkKind::Module.to_string(), "module");
    assert_eq!(ChunkKind::Import.to_string(), "import");
    assert_eq!(ChunkKind::Block.to_string(), "block");
}

#[test]
fn test_language_detection() {
    assert_eq!(Language::from_path(Path::new("a.py")), Language::Python);
    assert_eq!(Language::from_path(Path::new("a.js")), Language::JavaScript);
    assert_eq!(Language::from_path(Path::new("a.jsx")), Language::JavaScript);
    assert_eq!(Language::from_path(Path::new("a.mjs")), Language::JavaScript);
    assert_eq!(Language::from_path(Path::new("a.ts")), Language::TypeScript);
    assert_eq!(Language::from_path(Path::new("a.tsx")), Language::TypeScript);
    assert_eq!(Language::from_path(Path::new("a.d.ts")), Language::TypeScript);
    assert_eq!(Language::from_path(Path::new("a.rs")), Language::Unknown);
    assert_eq!(Language::from_path(Path::new("Makefile")), Language::Unknown);
}

#[test]
fn test_chunk_serde_round_trip() {
    let chunk = sample_chunk();
    let json = serde_json::to_string(&chunk).expect("serialize");
    let back: Chunk = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.id, chunk.id);
    assert_eq!(back.kind, chunk.kind);
    assert_eq!(back.start_line, chunk.start_line);
    assert_eq!(back.dependencies, chunk.dependencies);
}
