//! Local file-backed vector store
//!
//! One directory per collection under the configured root, with a single
//! `vectors.json` holding the committed view. Writes stage in memory and
//! publish atomically at `commit`, so readers always see the last
//! committed state and a crash mid-ingest loses only the staged run.
//!
//! Search is brute-force cosine similarity. At local-first scale (tens of
//! thousands of chunks per project) that is well inside budget and avoids
//! index maintenance entirely.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{MetadataFilter, SearchHit, VectorRecord, VectorStoreProvider};
use gardener_domain::registry::vector_store::{
    VECTOR_STORES, VectorStoreConfig, VectorStoreEntry,
};
use gardener_domain::utils::{atomic_write_json, read_json};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const COLLECTION_FILE: &str = "vectors.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCollection {
    dimensions: usize,
    records: Vec<VectorRecord>,
}

#[derive(Debug, Default)]
struct CollectionState {
    dimensions: usize,
    committed: BTreeMap<String, VectorRecord>,
    /// Staged mutations; `None` marks a deletion
    staged: BTreeMap<String, Option<VectorRecord>>,
}

impl CollectionState {
    fn from_persisted(persisted: PersistedCollection) -> Self {
        Self {
            dimensions: persisted.dimensions,
            committed: persisted
                .records
                .into_iter()
                .map(|r| (r.chunk_id.clone(), r))
                .collect(),
            staged: BTreeMap::new(),
        }
    }
}

/// File-backed vector store with staged writes
pub struct LocalVectorStore {
    root: PathBuf,
    collections: RwLock<HashMap<String, CollectionState>>,
}

impl LocalVectorStore {
    /// Create a store rooted at `root`. Collections load lazily.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn collection_file(&self, collection: &str) -> PathBuf {
        self.root.join(collection).join(COLLECTION_FILE)
    }

    /// Load a collection from disk into the cache if it is not resident.
    /// Returns whether the collection exists at all.
    async fn ensure_loaded(&self, collection: &str) -> Result<bool> {
        {
            let collections = self.collections.read().await;
            if collections.contains_key(collection) {
                return Ok(true);
            }
        }
        let file = self.collection_file(collection);
        if !file.exists() {
            return Ok(false);
        }
        let persisted: PersistedCollection = read_json(&file)
            .map_err(|e| Error::vector_store(format!("failed to load collection: {e}")))?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_insert_with(|| CollectionState::from_persisted(persisted));
        Ok(true)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn create_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        if self.ensure_loaded(collection).await? {
            let collections = self.collections.read().await;
            if let Some(state) = collections.get(collection) {
                if state.dimensions != dimensions {
                    return Err(Error::vector_store(format!(
                        "collection '{collection}' already exists with {} dimensions, requested {dimensions}",
                        state.dimensions
                    )));
                }
            }
            return Ok(());
        }
        let mut collections = self.collections.write().await;
        collections.insert(
            collection.to_owned(),
            CollectionState {
                dimensions,
                ..CollectionState::default()
            },
        );
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(collection);
        let dir = self.root.join(collection);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| {
                Error::vector_store(format!("failed to remove {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<()> {
        if !self.ensure_loaded(collection).await? {
            return Err(Error::vector_store(format!(
                "collection '{collection}' does not exist"
            )));
        }
        let mut collections = self.collections.write().await;
        let state = collections
            .get_mut(collection)
            .ok_or_else(|| Error::vector_store(format!("collection '{collection}' vanished")))?;

        for record in records {
            if record.vector.len() != state.dimensions {
                return Err(Error::vector_store(format!(
                    "vector for chunk '{}' has {} dimensions, collection '{collection}' expects {}",
                    record.chunk_id,
                    record.vector.len(),
                    state.dimensions
                )));
            }
            state.staged.insert(record.chunk_id.clone(), Some(record));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, chunk_ids: &[String]) -> Result<()> {
        if !self.ensure_loaded(collection).await? {
            return Ok(());
        }
        let mut collections = self.collections.write().await;
        if let Some(state) = collections.get_mut(collection) {
            for id in chunk_ids {
                state.staged.insert(id.clone(), None);
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>> {
        if !self.ensure_loaded(collection).await? {
            return Ok(Vec::new());
        }
        let collections = self.collections.read().await;
        let Some(state) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<SearchHit> = state
            .committed
            .values()
            .filter(|record| filter.is_none_or(|f| f.matches(&record.metadata)))
            .map(|record| SearchHit {
                chunk_id: record.chunk_id.clone(),
                score: cosine_similarity(query, &record.vector),
                metadata: record.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        if !self.ensure_loaded(collection).await? {
            return Ok(0);
        }
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map_or(0, |state| state.committed.len()))
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        if !self.ensure_loaded(collection).await? {
            return Ok(Vec::new());
        }
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|state| state.committed.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn commit(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let Some(state) = collections.get_mut(collection) else {
            return Err(Error::vector_store(format!(
                "collection '{collection}' does not exist"
            )));
        };

        // Apply staged mutations in chunk-id order, then persist the whole
        // committed view atomically.
        for (chunk_id, mutation) in std::mem::take(&mut state.staged) {
            match mutation {
                Some(record) => {
                    state.committed.insert(chunk_id, record);
                }
                None => {
                    state.committed.remove(&chunk_id);
                }
            }
        }

        let persisted = PersistedCollection {
            dimensions: state.dimensions,
            records: state.committed.values().cloned().collect(),
        };
        tracing::debug!(collection, records = persisted.records.len(), "committing collection");
        atomic_write_json(&self.collection_file(collection), &persisted)
    }

    fn provider_name(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::vector_store(format!(
                "vector store root {} is not writable: {e}",
                self.root.display()
            ))
        })
    }
}

#[linkme::distributed_slice(VECTOR_STORES)]
static LOCAL_VECTOR_STORE: VectorStoreEntry = VectorStoreEntry {
    name: "local",
    summary: "File-backed per-project store with brute-force cosine search",
    build: |config: &VectorStoreConfig| {
        let path = config
            .path
            .clone()
            .ok_or_else(|| "local vector store requires a storage path".to_owned())?;
        Ok(std::sync::Arc::new(LocalVectorStore::new(path)) as _)
    },
};
