use gardener_domain::entities::{MessageRole, Tier};
use gardener_domain::error::Error;
use gardener_infrastructure::capabilities::names;
use gardener_infrastructure::{AnalysisMode, Runtime};
use tempfile::TempDir;

use super::common::{offline_settings, write_python_tree};

async fn offline_runtime(dir: &TempDir) -> Runtime {
    Runtime::bootstrap(offline_settings(dir))
        .await
        .expect("bootstrap")
}

#[tokio::test]
async fn test_analyze_empty_directory() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let empty = dir.path().join("empty");
    std::fs::create_dir_all(&empty).expect("mkdir");

    let report = runtime
        .controller
        .analyze(&empty, AnalysisMode::Auto)
        .await
        .expect("analyze");

    assert_eq!(report.tier, Tier::Simple);
    assert_eq!(report.file_count, 0);
    assert_eq!(report.chunk_count, 0);
    assert!(report.warnings.is_empty());
    assert!(report.failures.is_empty());

    // The directory is now a registered, active project.
    let active = runtime.registry.get_active().expect("active project");
    assert_eq!(active.id, report.project_id);
}

#[tokio::test]
async fn test_analyze_small_tree_is_simple_tier() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("small"), 3);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");

    assert_eq!(report.tier, Tier::Simple);
    assert_eq!(report.file_count, 3);
    assert!(report.chunk_count > 0);
    assert_eq!(report.embedded_count, report.chunk_count);
    assert_eq!(
        report.language_histogram.get("python").copied(),
        Some(3)
    );
    assert!(!report.training_scheduled);

    // Analysis leaves one system marker in the project context.
    let recent = runtime
        .contexts
        .recent(&report.project_id, 10)
        .expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].role, MessageRole::System);
    assert!(recent[0].content.contains("analysis completed"));
}

#[tokio::test]
async fn test_analyze_medium_tree_is_standard_tier() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("medium"), 40);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");

    assert_eq!(report.tier, Tier::Standard);
    assert_eq!(report.file_count, 40);
    assert_eq!(report.embedded_count, report.chunk_count, "one vector per chunk");
    assert!(report.capabilities.has(names::RAG_RETRIEVAL));
}

#[tokio::test]
async fn test_reanalyze_reuses_project() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("tree"), 2);

    let first = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");
    let second = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("re-analyze");

    assert_eq!(first.project_id, second.project_id, "same path, same project");
    assert_eq!(runtime.registry.list().len(), 1);
}

#[tokio::test]
async fn test_advanced_mode_forces_tier() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("forced"), 2);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Advanced)
        .await
        .expect("analyze");

    assert_eq!(report.tier, Tier::Advanced);
    // The null runtime cannot train, so scheduling degrades to a warning.
    assert!(!report.training_scheduled);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("training_pipeline unavailable"))
    );
}

#[tokio::test]
async fn test_chat_with_retrieval_cites_files() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("chatty"), 6);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");

    let answer = runtime
        .controller
        .chat(&report.project_id, "what does handler_0 do?")
        .await
        .expect("chat");

    // The null LLM echoes the prompt, exposing exactly what was built.
    assert!(answer.contains("Context from the codebase:"));
    assert!(answer.contains("module_"), "retrieved chunks cite files");
    assert!(answer.contains("what does handler_0 do?"));

    // Exactly two messages per turn, after the analysis marker.
    let recent = runtime
        .contexts
        .recent(&report.project_id, 10)
        .expect("recent");
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[1].role, MessageRole::User);
    assert_eq!(recent[2].role, MessageRole::Assistant);
    assert_eq!(
        recent[1].metadata.get("retrieved").map(String::as_str),
        Some("5"),
        "top-k retrieval recorded"
    );
}

#[tokio::test]
async fn test_chat_degrades_without_retrieval() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("degraded"), 3);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");

    runtime
        .capabilities
        .disable(names::EMBEDDING_GENERATION)
        .await;

    let answer = runtime
        .controller
        .chat(&report.project_id, "describe this project")
        .await
        .expect("chat still answers");
    assert!(!answer.is_empty());
    assert!(
        !answer.contains("Context from the codebase:"),
        "no retrieval block without rag_retrieval"
    );
}

#[tokio::test]
async fn test_graceful_degradation_with_everything_off() {
    let dir = TempDir::new().expect("tempdir");
    let mut settings = offline_settings(&dir);
    settings.disabled_capabilities = vec![
        names::SEMANTIC_CHUNKING.to_owned(),
        names::EMBEDDING_GENERATION.to_owned(),
        names::VECTOR_STORAGE.to_owned(),
        names::SEMANTIC_SEARCH.to_owned(),
        names::RAG_RETRIEVAL.to_owned(),
        names::TRAINING_PIPELINE.to_owned(),
    ];
    let runtime = Runtime::bootstrap(settings).await.expect("bootstrap");
    let tree = write_python_tree(&dir.path().join("minimal"), 4);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze succeeds fully degraded");
    assert_eq!(report.tier, Tier::Simple, "no capabilities, minimum tier");
    assert_eq!(report.file_count, 4);
    assert!(report.chunk_count > 0, "whole-file blocks still produced");
    assert_eq!(report.embedded_count, 0);
    assert!(!report.warnings.is_empty());

    let answer = runtime
        .controller
        .chat(&report.project_id, "anything at all?")
        .await
        .expect("chat succeeds fully degraded");
    assert!(!answer.is_empty());
}

#[tokio::test]
async fn test_chat_with_unreachable_llm_leaves_context_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let mut settings = offline_settings(&dir);
    settings.llm.provider = "ollama".to_owned();
    settings.llm.host = "http://127.0.0.1:9".to_owned();
    settings.llm.connect_timeout_secs = 1;
    settings.llm.request_timeout_secs = 2;
    let runtime = Runtime::bootstrap(settings).await.expect("bootstrap");
    let tree = write_python_tree(&dir.path().join("offline-llm"), 2);

    let report = runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");
    let before = runtime
        .contexts
        .recent(&report.project_id, 100)
        .expect("recent")
        .len();

    let err = runtime
        .controller
        .chat(&report.project_id, "hello?")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::LlmUnavailable { .. } | Error::LlmTimeout { .. }
    ));

    let after = runtime
        .contexts
        .recent(&report.project_id, 100)
        .expect("recent")
        .len();
    assert_eq!(before, after, "neither user nor assistant message appended");
}

#[tokio::test]
async fn test_chat_unknown_project_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let err = runtime.controller.chat("ghost", "hi").await.unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_switch_sets_active_project() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree_a = write_python_tree(&dir.path().join("a"), 2);
    let tree_b = write_python_tree(&dir.path().join("b"), 2);

    let a = runtime
        .controller
        .analyze(&tree_a, AnalysisMode::Auto)
        .await
        .expect("analyze a");
    let b = runtime
        .controller
        .analyze(&tree_b, AnalysisMode::Auto)
        .await
        .expect("analyze b");
    assert_eq!(
        runtime.registry.get_active().expect("active").id,
        b.project_id
    );

    let switched = runtime.controller.switch(&a.project_id).await.expect("switch");
    assert_eq!(switched.id, a.project_id);
    assert_eq!(
        runtime.registry.get_active().expect("active").id,
        a.project_id
    );
}

#[tokio::test]
async fn test_features_reports_offline_stack() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let features = runtime.controller.features().await;
    assert_eq!(features.tier_count(), 5);
    assert!(features.has(names::PROJECT_MANAGEMENT));
    assert!(!features.has(names::TRAINING_PIPELINE));
}

#[tokio::test]
async fn test_export_after_analyze_and_chat() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let tree = write_python_tree(&dir.path().join("exported"), 3);

    runtime
        .controller
        .analyze(&tree, AnalysisMode::Auto)
        .await
        .expect("analyze");
    let report_id = runtime.registry.get_active().expect("active").id;
    runtime
        .controller
        .chat(&report_id, "what is here?")
        .await
        .expect("chat");

    let markdown = runtime.controller.export_markdown().expect("export");
    assert!(markdown.contains("# Project: exported"));
    assert!(markdown.contains("## Last analysis"));
    assert!(markdown.contains("tier: simple"));
    assert!(markdown.contains("## Recent conversation"));
}

#[tokio::test]
async fn test_export_without_active_project_is_user_error() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let err = runtime.controller.export_markdown().unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_analyze_missing_path_is_user_error() {
    let dir = TempDir::new().expect("tempdir");
    let runtime = offline_runtime(&dir).await;
    let err = runtime
        .controller
        .analyze(std::path::Path::new("/no/such/tree"), AnalysisMode::Auto)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 1);
}
