//! Ingestion pipeline
//!
//! parse → chunk → embed → index for one project. Per-file failures
//! accumulate and never abort the run; missing capabilities downgrade the
//! run (chunks without vectors, or whole-file blocks) and leave a warning
//! in the outcome. After a successful run the index holds exactly the
//! chunk ids of this ingest: stale ids from previous runs are deleted
//! before the commit.

use std::collections::BTreeSet;
use std::path::Path;

use gardener_domain::entities::{Chunk, IngestFailure, Project, SourceFile};
use gardener_domain::error::Result;
use gardener_domain::ports::{
    Capability, EmbeddingProvider, MetadataMap, VectorRecord, VectorStoreProvider,
};
use gardener_language::{ChunkingOptions, SemanticChunker};
use tracing::{debug, info, warn};

/// Result of one ingestion run
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Chunks produced by the chunker
    pub chunks: Vec<Chunk>,
    /// Chunks embedded and upserted into the index
    pub embedded_count: usize,
    /// Per-file failures (non-fatal)
    pub failures: Vec<IngestFailure>,
    /// Degradation warnings
    pub warnings: Vec<String>,
}

impl IngestOutcome {
    /// Number of chunks produced.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Chunk-embed-index pipeline for one project at a time
pub struct IngestPipeline {
    chunker: SemanticChunker,
    batch_bytes: usize,
}

impl IngestPipeline {
    /// Create a pipeline with the given chunking window and embedding
    /// batch byte budget.
    #[must_use]
    pub fn new(chunking: ChunkingOptions, batch_bytes: usize) -> Self {
        Self {
            chunker: SemanticChunker::new(chunking),
            batch_bytes: batch_bytes.max(1),
        }
    }

    /// Run the pipeline.
    ///
    /// `semantic` selects AST chunking; without it every file becomes one
    /// whole-file block. `collection` is the vector-store collection the
    /// project's index lives in.
    pub async fn ingest(
        &self,
        project: &Project,
        files: &[SourceFile],
        semantic: bool,
        collection: &str,
        embedding: &Capability<dyn EmbeddingProvider>,
        store: &Capability<dyn VectorStoreProvider>,
    ) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        self.chunk_files(project, files, semantic, &mut outcome);
        if outcome.chunks.is_empty() {
            return outcome;
        }

        let vectors = self.embed_chunks(&outcome.chunks, embedding, &mut outcome.warnings).await;
        if vectors.is_empty() {
            return outcome;
        }

        match store {
            Capability::Available(store) => {
                let dimensions = vectors[0].vector.len();
                match upsert_records(store.as_ref(), collection, dimensions, vectors).await {
                    Ok(count) => {
                        outcome.embedded_count = count;
                        info!(
                            project_id = %project.id,
                            chunks = outcome.chunks.len(),
                            embedded = count,
                            "ingest committed"
                        );
                    }
                    Err(e) => {
                        warn!(project_id = %project.id, error = %e, "vector index update failed");
                        outcome
                            .warnings
                            .push(format!("vector index update failed: {e}"));
                    }
                }
            }
            Capability::Unavailable { reason } => {
                outcome
                    .warnings
                    .push(format!("vector_storage unavailable: {reason}"));
            }
        }
        outcome
    }

    fn chunk_files(
        &self,
        project: &Project,
        files: &[SourceFile],
        semantic: bool,
        outcome: &mut IngestOutcome,
    ) {
        for file in files {
            let rel_path = relative_path(&file.path, &project.source_path);
            let content = match std::fs::read_to_string(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    outcome.failures.push(IngestFailure {
                        path: rel_path.display().to_string(),
                        message: format!("unreadable: {e}"),
                    });
                    continue;
                }
            };

            if semantic {
                // Unknown-language files are counted by discovery but not
                // chunked.
                if !file.language.is_supported() {
                    debug!(path = %rel_path.display(), "skipping unknown-language file");
                    continue;
                }
                match self
                    .chunker
                    .chunk_file(&project.id, &rel_path, &content, file.language)
                {
                    Ok(chunks) => outcome.chunks.extend(chunks),
                    Err(e) => outcome.failures.push(IngestFailure {
                        path: rel_path.display().to_string(),
                        message: e.to_string(),
                    }),
                }
            } else if !content.trim().is_empty() {
                outcome.chunks.push(SemanticChunker::whole_file_block(
                    &project.id,
                    &rel_path,
                    &content,
                    file.language,
                ));
            }
        }
    }

    /// Embed chunks in byte-bounded batches. A missing embedder records
    /// the chunks without vectors; a mid-run failure keeps what was
    /// embedded so far.
    async fn embed_chunks(
        &self,
        chunks: &[Chunk],
        embedding: &Capability<dyn EmbeddingProvider>,
        warnings: &mut Vec<String>,
    ) -> Vec<VectorRecord> {
        let provider = match embedding {
            Capability::Available(provider) => provider,
            Capability::Unavailable { reason } => {
                warnings.push(format!(
                    "embedding_generation unavailable: {reason}; chunks recorded without vectors"
                ));
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(chunks.len());
        for batch in byte_bounded_batches(chunks, self.batch_bytes) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            match provider.embed_batch(&texts).await {
                Ok(vectors) => {
                    for (chunk, vector) in batch.iter().zip(vectors) {
                        records.push(VectorRecord {
                            chunk_id: chunk.id.clone(),
                            vector,
                            metadata: chunk_metadata(chunk),
                        });
                    }
                }
                Err(e) => {
                    warn!(error = %e, "embedding batch failed, keeping earlier batches");
                    warnings.push(format!("embedding failed mid-run: {e}"));
                    break;
                }
            }
        }
        records
    }
}

async fn upsert_records(
    store: &dyn VectorStoreProvider,
    collection: &str,
    dimensions: usize,
    records: Vec<VectorRecord>,
) -> Result<usize> {
    store.create_collection(collection, dimensions).await?;

    let fresh: BTreeSet<String> = records.iter().map(|r| r.chunk_id.clone()).collect();
    let stale: Vec<String> = store
        .list_ids(collection)
        .await?
        .into_iter()
        .filter(|id| !fresh.contains(id))
        .collect();
    if !stale.is_empty() {
        debug!(count = stale.len(), "deleting stale chunk ids");
        store.delete(collection, &stale).await?;
    }

    let count = records.len();
    store.upsert(collection, records).await?;
    store.commit(collection).await?;
    Ok(count)
}

fn chunk_metadata(chunk: &Chunk) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    metadata.insert("file".to_owned(), chunk.file_path.display().to_string());
    metadata.insert("kind".to_owned(), chunk.kind.to_string());
    metadata.insert("language".to_owned(), chunk.language.to_string());
    metadata.insert("start_line".to_owned(), chunk.start_line.to_string());
    metadata.insert("end_line".to_owned(), chunk.end_line.to_string());
    // Retrieval reads the chunk text straight from metadata; the local
    // store is the only consumer and keys filters on the fields above.
    metadata.insert("text".to_owned(), chunk.text.clone());
    metadata
}

/// Group chunks into batches whose summed text size stays within `budget`.
fn byte_bounded_batches(chunks: &[Chunk], budget: usize) -> Vec<Vec<&Chunk>> {
    let mut batches = Vec::new();
    let mut batch: Vec<&Chunk> = Vec::new();
    let mut batch_bytes = 0usize;
    for chunk in chunks {
        if !batch.is_empty() && batch_bytes + chunk.text.len() > budget {
            batches.push(std::mem::take(&mut batch));
            batch_bytes = 0;
        }
        batch_bytes += chunk.text.len();
        batch.push(chunk);
    }
    if !batch.is_empty() {
        batches.push(batch);
    }
    batches
}

fn relative_path(path: &Path, root: &Path) -> std::path::PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
