use std::sync::Arc;

use gardener_domain::entities::{TrainingMetrics, TrainingStatus};
use gardener_domain::ports::{AdapterRuntime, Capability};
use gardener_infrastructure::{ProjectRegistry, Trainer};
use tempfile::TempDir;

use super::common::{FakeRuntime, data_root, wait_for_status};

fn setup(dir: &TempDir) -> (Arc<ProjectRegistry>, String) {
    let registry = Arc::new(ProjectRegistry::open(data_root(dir)).expect("open"));
    let project = registry.register("trainee", dir.path()).expect("register");
    (registry, project.id)
}

#[tokio::test]
async fn test_unavailable_runtime_fails_immediately() {
    let dir = TempDir::new().expect("tempdir");
    let (registry, project_id) = setup(&dir);
    let trainer = Trainer::new(
        Capability::unavailable("no training library installed"),
        Arc::clone(&registry),
        data_root(&dir),
        10,
    );

    trainer
        .schedule(&project_id, "llama3.2", Vec::new())
        .expect("schedule");
    // No background job: the failure is synchronous.
    assert!(!trainer.is_running(&project_id));
    assert_eq!(
        registry.get(&project_id).expect("project").training_status,
        TrainingStatus::Failed
    );

    let log = std::fs::read_to_string(data_root(&dir).training_log_file(&project_id))
        .expect("training log");
    assert!(log.contains("training failed"));
}

#[tokio::test]
async fn test_successful_training_completes_and_writes_artifacts() {
    let dir = TempDir::new().expect("tempdir");
    let (registry, project_id) = setup(&dir);
    let paths = data_root(&dir);
    let runtime: Arc<dyn AdapterRuntime> = Arc::new(FakeRuntime::sized(1024));
    let trainer = Trainer::new(
        Capability::available(runtime),
        Arc::clone(&registry),
        paths.clone(),
        10,
    );

    trainer
        .schedule(&project_id, "llama3.2", Vec::new())
        .expect("schedule");
    trainer.wait(&project_id).await;
    wait_for_status(&registry, &project_id, TrainingStatus::Completed).await;

    let project = registry.get(&project_id).expect("project");
    assert_eq!(project.adapter_path, Some(paths.adapter_dir(&project_id)));

    let metrics: TrainingMetrics =
        gardener_domain::utils::read_json(&paths.adapter_dir(&project_id).join("metrics.json"))
            .expect("metrics");
    assert_eq!(metrics.base_model, "llama3.2");
    assert_eq!(metrics.steps, 30);

    let log = std::fs::read_to_string(paths.training_log_file(&project_id)).expect("log");
    assert!(log.contains("step 10/30"));
    assert!(log.contains("step 30/30"));
}

#[tokio::test]
async fn test_failed_training_marks_failed() {
    let dir = TempDir::new().expect("tempdir");
    let (registry, project_id) = setup(&dir);
    let mut fake = FakeRuntime::sized(1024);
    fake.train_failure = Some("tensor backend exploded".to_owned());
    let runtime: Arc<dyn AdapterRuntime> = Arc::new(fake);
    let trainer = Trainer::new(
        Capability::available(runtime),
        Arc::clone(&registry),
        data_root(&dir),
        10,
    );

    trainer
        .schedule(&project_id, "llama3.2", Vec::new())
        .expect("schedule");
    trainer.wait(&project_id).await;
    wait_for_status(&registry, &project_id, TrainingStatus::Failed).await;
}

#[tokio::test]
async fn test_double_schedule_rejected_while_running() {
    let dir = TempDir::new().expect("tempdir");
    let (registry, project_id) = setup(&dir);
    let runtime: Arc<dyn AdapterRuntime> = Arc::new(FakeRuntime::sized(1024));
    let trainer = Trainer::new(
        Capability::available(runtime),
        Arc::clone(&registry),
        data_root(&dir),
        10,
    );

    trainer
        .schedule(&project_id, "llama3.2", Vec::new())
        .expect("schedule");
    // The first job may still be in flight; a second schedule while it
    // runs is a user error.
    if trainer.is_running(&project_id) {
        let err = trainer
            .schedule(&project_id, "llama3.2", Vec::new())
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
    trainer.wait(&project_id).await;
}

#[tokio::test]
async fn test_cancel_reports_running_state() {
    let dir = TempDir::new().expect("tempdir");
    let (registry, project_id) = setup(&dir);
    let runtime: Arc<dyn AdapterRuntime> = Arc::new(FakeRuntime::sized(1024));
    let trainer = Trainer::new(
        Capability::available(runtime),
        Arc::clone(&registry),
        data_root(&dir),
        10,
    );

    assert!(!trainer.cancel(&project_id), "nothing to cancel yet");
    trainer
        .schedule(&project_id, "llama3.2", Vec::new())
        .expect("schedule");
    // Either we catch the job mid-flight or it already finished; both are
    // valid outcomes for a cooperative cancel.
    let _ = trainer.cancel(&project_id);
    trainer.wait(&project_id).await;
}

#[tokio::test]
async fn test_schedule_unknown_project_fails() {
    let dir = TempDir::new().expect("tempdir");
    let registry = Arc::new(ProjectRegistry::open(data_root(&dir)).expect("open"));
    let runtime: Arc<dyn AdapterRuntime> = Arc::new(FakeRuntime::sized(1024));
    let trainer = Trainer::new(
        Capability::available(runtime),
        registry,
        data_root(&dir),
        10,
    );

    assert!(trainer.schedule("ghost", "llama3.2", Vec::new()).is_err());
}
