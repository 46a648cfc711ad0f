//! Analysis controller
//!
//! The single orchestrator behind the user-facing operations. `analyze`
//! drives discovery → chunking → embedding → indexing → (optional)
//! training; `chat` drives retrieval → adapter → prompt → completion.
//! Capability failures are caught here and translated into degraded
//! execution with a warning in the report; only an unreachable LLM
//! surfaces to the caller as an error.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use gardener_domain::entities::{
    AnalysisReport, MessageRole, Project, SourceFile, Tier,
};
use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{Capability, CompletionRequest, EmbeddingProvider, VectorStoreProvider};
use tracing::{debug, info, warn};

use crate::adapters::AdapterLoader;
use crate::capabilities::{CapabilityRegistry, names};
use crate::config::{DataRoot, Settings};
use crate::context::ContextManager;
use crate::registry::ProjectRegistry;
use crate::services::discovery::{DiscoveryOptions, discover};
use crate::services::ingest::IngestPipeline;
use crate::services::prompt::{RetrievedChunk, build_prompt, format_context_block};
use crate::training::Trainer;

/// Analysis depth requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Pick the tier from codebase size and capability availability
    #[default]
    Auto,
    /// Force the advanced tier (training still requires its capability)
    Advanced,
}

/// Single orchestrator over every subsystem
pub struct AnalysisController {
    settings: Arc<Settings>,
    paths: DataRoot,
    capabilities: Arc<CapabilityRegistry>,
    registry: Arc<ProjectRegistry>,
    contexts: Arc<ContextManager>,
    loader: Arc<AdapterLoader>,
    trainer: Arc<Trainer>,
    pipeline: IngestPipeline,
}

impl AnalysisController {
    /// Wire the controller over already-constructed subsystems.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        paths: DataRoot,
        capabilities: Arc<CapabilityRegistry>,
        registry: Arc<ProjectRegistry>,
        contexts: Arc<ContextManager>,
        loader: Arc<AdapterLoader>,
        trainer: Arc<Trainer>,
    ) -> Self {
        let pipeline = IngestPipeline::new(
            gardener_language::ChunkingOptions {
                min_chars: settings.chunking.min_chars,
                max_chars: settings.chunking.max_chars,
            },
            settings.embedding.batch_bytes,
        );
        Self {
            settings,
            paths,
            capabilities,
            registry,
            contexts,
            loader,
            trainer,
            pipeline,
        }
    }

    /// Analyze a source tree, registering it as a project if needed.
    ///
    /// # Errors
    ///
    /// Returns a user error for a bad path and persistence errors from
    /// registry writes; capability failures degrade with warnings instead.
    pub async fn analyze(&self, source_path: &Path, mode: AnalysisMode) -> Result<AnalysisReport> {
        let source_path = std::fs::canonicalize(source_path)
            .map_err(|_| Error::user(format!("'{}' does not exist", source_path.display())))?;

        let project = self.ensure_project(&source_path)?;
        self.registry.set_active(&project.id)?;

        let mut warnings: Vec<String> = self.registry.load_warnings().to_vec();

        let options = DiscoveryOptions {
            exclude_dirs: self.settings.discovery.exclude_dirs.clone(),
            progress_every: self.settings.discovery.progress_every,
            ..DiscoveryOptions::default()
        };
        let files = discover(&source_path, &options, |count| {
            debug!(count, "discovery progress");
        })?;
        let language_histogram = histogram(&files);

        let features = self.capabilities.features().await;
        let tier = match mode {
            AnalysisMode::Advanced => Tier::Advanced,
            AnalysisMode::Auto => Tier::select(files.len(), features.tier_count()),
        };
        info!(
            project_id = %project.id,
            files = files.len(),
            %tier,
            "analysis started"
        );

        let semantic = self.capabilities.is_available(names::SEMANTIC_CHUNKING).await;
        if !semantic {
            warnings.push(
                "semantic_chunking unavailable: emitting whole-file blocks".to_owned(),
            );
        }

        let embedding = self.gated_embedding().await;
        let store = self.gated_store().await;
        let outcome = self
            .pipeline
            .ingest(
                &project,
                &files,
                semantic,
                &DataRoot::vector_collection(&project.id),
                &embedding,
                &store,
            )
            .await;
        warnings.extend(outcome.warnings.iter().cloned());

        let mut training_scheduled = false;
        if tier == Tier::Advanced && !outcome.chunks.is_empty() {
            if self.capabilities.is_available(names::TRAINING_PIPELINE).await {
                match self.trainer.schedule(
                    &project.id,
                    &self.settings.adapters.base_model,
                    outcome.chunks.clone(),
                ) {
                    Ok(()) => training_scheduled = true,
                    Err(e) => warnings.push(format!("training not scheduled: {e}")),
                }
            } else {
                let verdict = self.capabilities.check(names::TRAINING_PIPELINE).await;
                warnings.push(format!(
                    "training_pipeline unavailable: {}",
                    verdict.reason.unwrap_or_else(|| "unknown reason".to_owned())
                ));
            }
        }

        let mut refreshed = self.registry.get(&project.id)?;
        refreshed.touch();
        self.registry.update(refreshed.clone())?;

        let marker = format!(
            "analysis completed: {} files, {} chunks, tier {tier}",
            files.len(),
            outcome.chunk_count()
        );
        if let Err(e) = self
            .contexts
            .add_message(&project.id, MessageRole::System, &marker, None)
        {
            warnings.push(format!("context persistence warning: {e}"));
        }

        let report = AnalysisReport {
            project_id: project.id.clone(),
            tier,
            file_count: files.len(),
            language_histogram,
            chunk_count: outcome.chunk_count(),
            embedded_count: outcome.embedded_count,
            training_scheduled,
            warnings,
            failures: outcome.failures,
            capabilities: features,
            completed_at: Utc::now(),
        };

        match serde_json::to_value(&report) {
            Ok(value) => {
                if let Err(e) = self.contexts.set_state(&project.id, "last_report", value) {
                    warn!(project_id = %project.id, error = %e, "failed to persist analysis report");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize analysis report"),
        }

        info!(
            project_id = %project.id,
            chunks = report.chunk_count,
            embedded = report.embedded_count,
            "analysis completed"
        );
        Ok(report)
    }

    /// Answer a question about a project, grounded in retrieved context.
    ///
    /// Degrades in order: no retrieval → no adapter → base model without
    /// context. The conversation is only appended after a successful
    /// completion, so an unreachable LLM leaves the context untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown projects and `LlmUnavailable` /
    /// `LlmTimeout` when the model endpoint fails.
    pub async fn chat(&self, project_id: &str, question: &str) -> Result<String> {
        let project = self.registry.get(project_id)?;

        let mut retrieved: Vec<RetrievedChunk> = Vec::new();
        if self.capabilities.is_available(names::RAG_RETRIEVAL).await {
            match self.retrieve(&project, question).await {
                Ok(chunks) => retrieved = chunks,
                Err(e) => {
                    warn!(project_id, error = %e, "retrieval failed, continuing without context");
                }
            }
        } else {
            let verdict = self.capabilities.check(names::RAG_RETRIEVAL).await;
            debug!(
                project_id,
                reason = verdict.reason.as_deref().unwrap_or("unavailable"),
                "rag_retrieval unavailable, continuing without context"
            );
        }

        let artifact = project
            .adapter_path
            .clone()
            .unwrap_or_else(|| self.paths.adapter_dir(&project.id));
        match self.loader.load(&project.id, &artifact).await {
            Ok(handle) if handle.is_noop() => {
                debug!(project_id, "no project adapter, using the base model");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(project_id, error = %e, "adapter load failed, falling back to base model");
            }
        }

        let history = self
            .contexts
            .recent(project_id, self.settings.retrieval.history_turns * 2)?;
        let context_block = if retrieved.is_empty() {
            None
        } else {
            Some(format_context_block(&retrieved))
        };
        let prompt = build_prompt(&project.name, context_block.as_deref(), &history, question);

        let llm = self
            .capabilities
            .llm()
            .await
            .require("llm_inference")
            .map_err(|e| Error::llm_unavailable(e.to_string()))?;
        let request =
            CompletionRequest::new(prompt).with_model(self.settings.llm.model.clone());
        let answer = llm.generate(request).await?;

        let mut metadata = BTreeMap::new();
        metadata.insert("retrieved".to_owned(), retrieved.len().to_string());
        if let Err(e) =
            self.contexts
                .add_message(project_id, MessageRole::User, question, Some(metadata))
        {
            warn!(project_id, error = %e, "failed to persist user message");
        }
        if let Err(e) = self
            .contexts
            .add_message(project_id, MessageRole::Assistant, &answer, None)
        {
            warn!(project_id, error = %e, "failed to persist assistant message");
        }
        Ok(answer)
    }

    /// Current capability availability snapshot.
    pub async fn features(&self) -> gardener_domain::entities::CapabilitySet {
        self.capabilities.features().await
    }

    /// Set the active project and warm its adapter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown projects and persistence errors from
    /// the registry write.
    pub async fn switch(&self, project_id: &str) -> Result<Project> {
        self.registry.set_active(project_id)?;
        let project = self.registry.get(project_id)?;

        let artifact = project
            .adapter_path
            .clone()
            .unwrap_or_else(|| self.paths.adapter_dir(project_id));
        if let Err(e) = self.loader.load(project_id, &artifact).await {
            warn!(project_id, error = %e, "adapter warm-up failed");
        }
        Ok(project)
    }

    /// Render the active project's latest report and conversation tail as
    /// Markdown.
    ///
    /// # Errors
    ///
    /// Returns a user error when no project is active.
    pub fn export_markdown(&self) -> Result<String> {
        let project = self
            .registry
            .get_active()
            .ok_or_else(|| Error::user("no active project; run analyze first"))?;

        let context = self.contexts.get(&project.id)?;
        let report = context
            .analysis_state
            .get("last_report")
            .and_then(|value| serde_json::from_value::<AnalysisReport>(value.clone()).ok());
        let recent = context.recent(20);
        Ok(super::export::render_markdown(&project, report.as_ref(), recent))
    }

    fn ensure_project(&self, source_path: &Path) -> Result<Project> {
        if let Some(project) = self.registry.find_by_source_path(source_path) {
            return Ok(project);
        }
        let name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project");
        self.registry.register(name, source_path)
    }

    async fn retrieve(&self, project: &Project, question: &str) -> Result<Vec<RetrievedChunk>> {
        let embedder = self
            .capabilities
            .embedding()
            .await
            .require(names::EMBEDDING_GENERATION)?;
        let store = self
            .capabilities
            .vector_store()
            .await
            .require(names::VECTOR_STORAGE)?;

        let query = embedder.embed(question).await?;
        let hits = store
            .search(
                &DataRoot::vector_collection(&project.id),
                &query,
                self.settings.retrieval.top_k,
                None,
            )
            .await?;

        let min_score = self.settings.retrieval.min_score;
        Ok(hits
            .into_iter()
            .filter(|hit| hit.score >= min_score)
            .map(|hit| {
                let citation = format!(
                    "{}:{}-{}",
                    hit.metadata.get("file").map_or("unknown", String::as_str),
                    hit.metadata.get("start_line").map_or("?", String::as_str),
                    hit.metadata.get("end_line").map_or("?", String::as_str),
                );
                RetrievedChunk {
                    citation,
                    text: hit.metadata.get("text").cloned().unwrap_or_default(),
                    score: hit.score,
                }
            })
            .collect())
    }

    /// Embedding capability gated by the availability verdict, so a
    /// resolved-but-unhealthy provider still degrades.
    async fn gated_embedding(&self) -> Capability<dyn EmbeddingProvider> {
        let verdict = self.capabilities.check(names::EMBEDDING_GENERATION).await;
        if verdict.available {
            self.capabilities.embedding().await
        } else {
            Capability::unavailable(
                verdict.reason.unwrap_or_else(|| "unavailable".to_owned()),
            )
        }
    }

    async fn gated_store(&self) -> Capability<dyn VectorStoreProvider> {
        let verdict = self.capabilities.check(names::VECTOR_STORAGE).await;
        if verdict.available {
            self.capabilities.vector_store().await
        } else {
            Capability::unavailable(
                verdict.reason.unwrap_or_else(|| "unavailable".to_owned()),
            )
        }
    }
}

fn histogram(files: &[SourceFile]) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for file in files {
        *histogram.entry(file.language.to_string()).or_insert(0) += 1;
    }
    histogram
}
