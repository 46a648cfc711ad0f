use std::sync::Arc;

use gardener_infrastructure::CapabilityRegistry;
use gardener_infrastructure::capabilities::names;
use tempfile::TempDir;

use super::common::{data_root, offline_settings};

fn offline_registry(dir: &TempDir) -> CapabilityRegistry {
    CapabilityRegistry::new(Arc::new(offline_settings(dir)), data_root(dir))
}

#[tokio::test]
async fn test_offline_stack_availability() {
    let dir = TempDir::new().expect("tempdir");
    let registry = offline_registry(&dir);

    assert!(registry.is_available(names::PROJECT_MANAGEMENT).await);
    assert!(registry.is_available(names::SEMANTIC_CHUNKING).await);
    assert!(registry.is_available(names::EMBEDDING_GENERATION).await);
    assert!(registry.is_available(names::VECTOR_STORAGE).await);
    assert!(registry.is_available(names::SEMANTIC_SEARCH).await);
    assert!(registry.is_available(names::RAG_RETRIEVAL).await);
    // The null runtime reports the training library as absent.
    assert!(!registry.is_available(names::TRAINING_PIPELINE).await);
}

#[tokio::test]
async fn test_unknown_capability_is_unavailable() {
    let dir = TempDir::new().expect("tempdir");
    let registry = offline_registry(&dir);
    let verdict = registry.check("teleportation").await;
    assert!(!verdict.available);
    assert!(verdict.reason.expect("reason").contains("unknown capability"));
}

#[tokio::test]
async fn test_dependency_closure_for_composites() {
    let dir = TempDir::new().expect("tempdir");
    let registry = offline_registry(&dir);

    registry.disable(names::EMBEDDING_GENERATION).await;
    let verdict = registry.check(names::RAG_RETRIEVAL).await;
    assert!(!verdict.available, "composite follows its dependencies");
    assert!(
        verdict
            .reason
            .expect("reason")
            .contains("embedding_generation")
    );

    let verdict = registry.check(names::SEMANTIC_SEARCH).await;
    assert!(!verdict.available);
}

#[tokio::test]
async fn test_disable_forces_capability_off() {
    let dir = TempDir::new().expect("tempdir");
    let registry = offline_registry(&dir);

    assert!(registry.is_available(names::VECTOR_STORAGE).await);
    registry.disable(names::VECTOR_STORAGE).await;
    let verdict = registry.check(names::VECTOR_STORAGE).await;
    assert!(!verdict.available);
    assert_eq!(verdict.reason.as_deref(), Some("disabled by configuration"));
}

#[tokio::test]
async fn test_disabled_capabilities_from_settings() {
    let dir = TempDir::new().expect("tempdir");
    let mut settings = offline_settings(&dir);
    settings.disabled_capabilities = vec![names::EMBEDDING_GENERATION.to_owned()];
    let registry = CapabilityRegistry::new(Arc::new(settings), data_root(&dir));

    assert!(!registry.is_available(names::EMBEDDING_GENERATION).await);
    assert!(!registry.is_available(names::RAG_RETRIEVAL).await);
    assert!(registry.is_available(names::VECTOR_STORAGE).await);
}

#[tokio::test]
async fn test_unknown_provider_downgrades_to_standin() {
    let dir = TempDir::new().expect("tempdir");
    let mut settings = offline_settings(&dir);
    settings.embedding.provider = "nonexistent-provider".to_owned();
    let registry = CapabilityRegistry::new(Arc::new(settings), data_root(&dir));

    // Resolution failure never propagates; it becomes a stand-in.
    let capability = registry.embedding().await;
    assert!(!capability.is_available());
    assert!(!registry.is_available(names::EMBEDDING_GENERATION).await);
}

#[tokio::test]
async fn test_features_snapshot_counts_tier_capabilities() {
    let dir = TempDir::new().expect("tempdir");
    let registry = offline_registry(&dir);

    let features = registry.features().await;
    assert_eq!(features.features.len(), 7);
    assert!(features.checked_at.is_some());
    // Offline stack: five of the six tier capabilities; only the
    // training pipeline is off.
    assert_eq!(features.tier_count(), 5);
    assert!(features.has(names::RAG_RETRIEVAL));
    assert!(!features.has(names::TRAINING_PIPELINE));
    assert!(
        features
            .reasons
            .get(names::TRAINING_PIPELINE)
            .is_some_and(|r| r.contains("training"))
    );
}

#[tokio::test]
async fn test_invalidate_drops_cached_verdict() {
    let dir = TempDir::new().expect("tempdir");
    let registry = offline_registry(&dir);

    assert!(registry.is_available(names::EMBEDDING_GENERATION).await);
    registry.invalidate(Some(names::EMBEDDING_GENERATION)).await;
    // Re-probe succeeds again; the call exercises the uncached path.
    assert!(registry.is_available(names::EMBEDDING_GENERATION).await);

    registry.invalidate(None).await;
    assert!(registry.is_available(names::VECTOR_STORAGE).await);
}

#[tokio::test]
async fn test_provider_instances_constructed_once() {
    let dir = TempDir::new().expect("tempdir");
    let registry = Arc::new(offline_registry(&dir));

    // Concurrent gets must agree on one instance (no double construction
    // observable through divergent configs).
    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.embedding().await.is_available()
        }));
    }
    for handle in handles {
        assert!(handle.await.expect("join"));
    }
}
