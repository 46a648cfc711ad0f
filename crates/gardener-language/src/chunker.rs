//! Semantic chunking
//!
//! Cuts a parsed file at semantic boundaries: functions, classes, import
//! groups, and runs of top-level module code. Segments outside the
//! configured size window are merged with adjacent siblings or split at
//! line boundaries, and every emitted chunk carries its complexity score
//! and external references.

use std::path::Path;

use gardener_domain::entities::{Chunk, ChunkKind, Language};
use tree_sitter::Node;

use crate::complexity;
use crate::error::Result;
use crate::parser::SourceParser;
use crate::symbols;

/// Size window for emitted chunks, in characters
#[derive(Debug, Clone, Copy)]
pub struct ChunkingOptions {
    /// Segments smaller than this merge into a neighbor
    pub min_chars: usize,
    /// Segments larger than this split at line boundaries
    pub max_chars: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            min_chars: 64,
            max_chars: 2048,
        }
    }
}

/// AST-based chunker with a line-based fallback
#[derive(Debug, Default)]
pub struct SemanticChunker {
    options: ChunkingOptions,
    parser: SourceParser,
}

/// A candidate chunk before text extraction
struct Segment {
    kind: ChunkKind,
    byte_start: usize,
    byte_end: usize,
    start_line: usize,
    end_line: usize,
    complexity: u32,
    dependencies: Vec<String>,
}

impl Segment {
    fn len(&self) -> usize {
        self.byte_end - self.byte_start
    }

    fn absorb(&mut self, other: Segment) {
        self.byte_end = other.byte_end;
        self.end_line = other.end_line;
        self.complexity += other.complexity;
        for dep in other.dependencies {
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
    }
}

enum SegmentClass {
    Import,
    Definition(ChunkKind),
    Statement,
}

impl SemanticChunker {
    /// Create a chunker with the given size window.
    #[must_use]
    pub fn new(options: ChunkingOptions) -> Self {
        Self {
            options,
            parser: SourceParser::new(),
        }
    }

    /// Chunk one file at semantic boundaries.
    ///
    /// Unsupported languages go through the line-based fallback. Empty
    /// files produce no chunks.
    ///
    /// # Errors
    ///
    /// Propagates parse failures; the caller records them per file and
    /// continues ingesting.
    pub fn chunk_file(
        &self,
        project_id: &str,
        file_path: &Path,
        content: &str,
        language: Language,
    ) -> Result<Vec<Chunk>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        if !SourceParser::supports(language) {
            tracing::trace!(path = %file_path.display(), %language, "line-based fallback");
            return Ok(self.fallback_blocks(project_id, file_path, content, language));
        }

        let tree = self.parser.parse(content, language)?;
        let segments = self.collect_segments(tree.root_node(), content, language);
        let segments = self.merge_small(segments);
        let segments = self.split_large(segments, content);

        Ok(segments
            .into_iter()
            .map(|seg| build_chunk(project_id, file_path, language, content, seg))
            .collect())
    }

    /// Line-bounded `Block` chunks for unstructured or unparsable content.
    #[must_use]
    pub fn fallback_blocks(
        &self,
        project_id: &str,
        file_path: &Path,
        content: &str,
        language: Language,
    ) -> Vec<Chunk> {
        split_lines(content, 0, 1, self.options.max_chars, ChunkKind::Block)
            .into_iter()
            .map(|seg| build_chunk(project_id, file_path, language, content, seg))
            .collect()
    }

    /// One `Block` chunk covering the whole file.
    ///
    /// Used when semantic chunking is unavailable and analysis degrades to
    /// whole-file granularity.
    #[must_use]
    pub fn whole_file_block(
        project_id: &str,
        file_path: &Path,
        content: &str,
        language: Language,
    ) -> Chunk {
        let line_count = content.lines().count().max(1);
        let seg = Segment {
            kind: ChunkKind::Block,
            byte_start: 0,
            byte_end: content.len(),
            start_line: 1,
            end_line: line_count,
            complexity: (line_count / 10 + 1) as u32,
            dependencies: Vec::new(),
        };
        build_chunk(project_id, file_path, language, content, seg)
    }

    fn collect_segments(&self, root: Node<'_>, content: &str, language: Language) -> Vec<Segment> {
        let source = content.as_bytes();
        let mut segments: Vec<Segment> = Vec::new();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            if child.kind() == "comment" {
                continue;
            }
            match classify(child, language) {
                SegmentClass::Import => {
                    let seg = segment_from_node(child, source, language, ChunkKind::Import);
                    match segments.last_mut() {
                        Some(last) if last.kind == ChunkKind::Import => last.absorb(seg),
                        _ => segments.push(seg),
                    }
                }
                SegmentClass::Definition(kind) => {
                    segments.push(segment_from_node(child, source, language, kind));
                }
                SegmentClass::Statement => {
                    let seg = segment_from_node(child, source, language, ChunkKind::Module);
                    match segments.last_mut() {
                        Some(last) if last.kind == ChunkKind::Module => last.absorb(seg),
                        _ => segments.push(seg),
                    }
                }
            }
        }
        segments
    }

    /// Merge undersized segments into their predecessor (or successor at
    /// the start of the file). The accumulator keeps its kind.
    fn merge_small(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let min = self.options.min_chars;
        let mut out: Vec<Segment> = Vec::new();
        for seg in segments {
            match out.last_mut() {
                Some(last) if seg.len() < min || last.len() < min => last.absorb(seg),
                _ => out.push(seg),
            }
        }
        out
    }

    fn split_large(&self, segments: Vec<Segment>, content: &str) -> Vec<Segment> {
        let max = self.options.max_chars;
        let mut out = Vec::new();
        for seg in segments {
            if seg.len() <= max {
                out.push(seg);
                continue;
            }
            let kind = seg.kind;
            let mut pieces = split_lines(
                &content[seg.byte_start..seg.byte_end],
                seg.byte_start,
                seg.start_line,
                max,
                kind,
            );
            // The first piece inherits the segment's metadata; the rest are
            // plain continuations.
            if let Some(first) = pieces.first_mut() {
                first.complexity = seg.complexity;
                first.dependencies = seg.dependencies.clone();
            }
            out.append(&mut pieces);
        }
        out
    }
}

/// Split text into line-bounded segments of at most `max` bytes.
fn split_lines(
    text: &str,
    byte_offset: usize,
    first_line: usize,
    max: usize,
    kind: ChunkKind,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut piece_start = 0usize;
    let mut piece_line = first_line;
    let mut piece_len = 0usize;
    let mut piece_lines = 0usize;

    for line in text.split_inclusive('\n') {
        if piece_len > 0 && piece_len + line.len() > max {
            segments.push(Segment {
                kind,
                byte_start: byte_offset + piece_start,
                byte_end: byte_offset + piece_start + piece_len,
                start_line: piece_line,
                end_line: piece_line + piece_lines - 1,
                complexity: (piece_lines / 10 + 1) as u32,
                dependencies: Vec::new(),
            });
            piece_start += piece_len;
            piece_line += piece_lines;
            piece_len = 0;
            piece_lines = 0;
        }
        piece_len += line.len();
        piece_lines += 1;
    }
    if piece_len > 0 {
        segments.push(Segment {
            kind,
            byte_start: byte_offset + piece_start,
            byte_end: byte_offset + piece_start + piece_len,
            start_line: piece_line,
            end_line: piece_line + piece_lines - 1,
            complexity: (piece_lines / 10 + 1) as u32,
            dependencies: Vec::new(),
        });
    }
    segments
}

fn segment_from_node(
    node: Node<'_>,
    source: &[u8],
    language: Language,
    kind: ChunkKind,
) -> Segment {
    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;
    let metrics = complexity::analyze(node, language);
    Segment {
        kind,
        byte_start: node.start_byte(),
        byte_end: node.end_byte(),
        start_line,
        end_line,
        complexity: metrics.score(end_line - start_line + 1),
        dependencies: symbols::external_references(node, source, language),
    }
}

fn classify(node: Node<'_>, language: Language) -> SegmentClass {
    match language {
        Language::Python => match node.kind() {
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                SegmentClass::Import
            }
            "function_definition" => SegmentClass::Definition(ChunkKind::Function),
            "class_definition" => SegmentClass::Definition(ChunkKind::Class),
            "decorated_definition" => node
                .child_by_field_name("definition")
                .map_or(SegmentClass::Statement, |inner| match inner.kind() {
                    "function_definition" => SegmentClass::Definition(ChunkKind::Function),
                    "class_definition" => SegmentClass::Definition(ChunkKind::Class),
                    _ => SegmentClass::Statement,
                }),
            _ => SegmentClass::Statement,
        },
        Language::JavaScript | Language::TypeScript => match node.kind() {
            "import_statement" => SegmentClass::Import,
            "function_declaration" | "generator_function_declaration" => {
                SegmentClass::Definition(ChunkKind::Function)
            }
            "class_declaration" | "abstract_class_declaration" => {
                SegmentClass::Definition(ChunkKind::Class)
            }
            "interface_declaration" | "enum_declaration" | "type_alias_declaration" => {
                SegmentClass::Definition(ChunkKind::Class)
            }
            // Exported declarations keep the export span but classify by
            // what they export.
            "export_statement" => node
                .child_by_field_name("declaration")
                .map_or(SegmentClass::Statement, |inner| classify(inner, language)),
            _ => SegmentClass::Statement,
        },
        Language::Unknown => SegmentClass::Statement,
    }
}

fn build_chunk(
    project_id: &str,
    file_path: &Path,
    language: Language,
    content: &str,
    seg: Segment,
) -> Chunk {
    Chunk {
        id: Chunk::stable_id(project_id, file_path, seg.kind, seg.start_line),
        project_id: project_id.to_owned(),
        file_path: file_path.to_path_buf(),
        language,
        kind: seg.kind,
        byte_start: seg.byte_start,
        byte_end: seg.byte_end,
        start_line: seg.start_line,
        end_line: seg.end_line,
        complexity: seg.complexity,
        dependencies: seg.dependencies,
        text: content[seg.byte_start..seg.byte_end].to_owned(),
    }
}
