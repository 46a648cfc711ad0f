use gardener_infrastructure::config::{ConfigLoader, DataRoot, Settings};
use serial_test::serial;
use tempfile::TempDir;

#[allow(unsafe_code)]
fn clear_gardener_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("GARDENER_") {
            // Safety: tests are serialized via #[serial].
            unsafe { std::env::remove_var(&key) };
        }
    }
}

#[test]
#[serial]
fn test_defaults_without_any_configuration() {
    clear_gardener_env();
    let settings = Settings::default();
    assert_eq!(settings.llm.host, "http://localhost:11434");
    assert_eq!(settings.llm.connect_timeout_secs, 5);
    assert_eq!(settings.llm.request_timeout_secs, 120);
    assert_eq!(settings.retrieval.top_k, 5);
    assert_eq!(settings.context.max_messages, 200);
    assert_eq!(settings.context.max_in_memory, 8);
    assert_eq!(settings.adapters.max_memory_bytes, 4_831_838_208);
    assert_eq!(settings.vector_store.provider, "local");
    assert!(!settings.debug);
}

#[test]
#[serial]
fn test_toml_file_overrides_defaults() {
    clear_gardener_env();
    let dir = TempDir::new().expect("tempdir");
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
debug = true

[llm]
host = "http://localhost:9999"
model = "custom-model"

[retrieval]
top_k = 9
"#,
    )
    .expect("write config");

    let settings = ConfigLoader::new()
        .with_config_path(&config_path)
        .load()
        .expect("load");
    assert!(settings.debug);
    assert_eq!(settings.llm.host, "http://localhost:9999");
    assert_eq!(settings.llm.model, "custom-model");
    assert_eq!(settings.retrieval.top_k, 9);
    // Untouched sections keep their defaults.
    assert_eq!(settings.context.max_messages, 200);
}

#[test]
#[serial]
#[allow(unsafe_code)]
fn test_flat_env_aliases_win() {
    clear_gardener_env();
    let dir = TempDir::new().expect("tempdir");
    unsafe {
        std::env::set_var("GARDENER_DATA_ROOT", dir.path());
        std::env::set_var("GARDENER_LLM_HOST", "http://envhost:1234");
        std::env::set_var("GARDENER_LLM_MODEL", "env-model");
        std::env::set_var("GARDENER_RETRIEVAL_TOP_K", "3");
        std::env::set_var("GARDENER_MAX_CACHED_ADAPTERS", "2");
        std::env::set_var("GARDENER_CHUNK_MIN_CHARS", "10");
        std::env::set_var("GARDENER_CHUNK_MAX_CHARS", "100");
        std::env::set_var("GARDENER_DEBUG", "true");
    }

    let settings = ConfigLoader::new().load().expect("load");
    clear_gardener_env();

    assert_eq!(settings.data_root.as_deref(), Some(dir.path()));
    assert_eq!(settings.llm.host, "http://envhost:1234");
    assert_eq!(settings.llm.model, "env-model");
    assert_eq!(settings.retrieval.top_k, 3);
    assert_eq!(settings.adapters.max_cached, 2);
    assert_eq!(settings.chunking.min_chars, 10);
    assert_eq!(settings.chunking.max_chars, 100);
    assert!(settings.debug);
}

#[test]
#[serial]
#[allow(unsafe_code)]
fn test_invalid_env_value_is_a_config_error() {
    clear_gardener_env();
    unsafe {
        std::env::set_var("GARDENER_RETRIEVAL_TOP_K", "many");
    }
    let result = ConfigLoader::new().load();
    clear_gardener_env();
    assert!(result.is_err());
}

#[test]
#[serial]
#[allow(unsafe_code)]
fn test_validation_rejects_inverted_chunk_window() {
    clear_gardener_env();
    unsafe {
        std::env::set_var("GARDENER_CHUNK_MIN_CHARS", "500");
        std::env::set_var("GARDENER_CHUNK_MAX_CHARS", "100");
    }
    let result = ConfigLoader::new().load();
    clear_gardener_env();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("inverted"));
}

#[test]
#[serial]
fn test_missing_explicit_config_path_fails() {
    clear_gardener_env();
    let err = ConfigLoader::new()
        .with_config_path("/nonexistent/config.toml")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_data_root_layout() {
    let dir = TempDir::new().expect("tempdir");
    let root = DataRoot::at(dir.path().to_path_buf());
    root.ensure_layout().expect("layout");

    assert!(root.base_models_dir().is_dir());
    assert!(root.projects_dir().is_dir());
    assert!(root.logs_dir().is_dir());
    assert_eq!(root.registry_file(), dir.path().join("registry.json"));
    assert_eq!(
        root.active_project_file(),
        dir.path().join("active_project.json")
    );
    assert_eq!(
        root.project_context_file("p1"),
        dir.path().join("projects").join("p1").join("context.json")
    );
    assert_eq!(
        root.vector_store_dir("p1"),
        dir.path().join("projects").join("p1").join("vector_store")
    );
    assert_eq!(DataRoot::vector_collection("p1"), "p1/vector_store");
}

#[test]
#[serial]
fn test_resolve_data_root_prefers_settings() {
    clear_gardener_env();
    let dir = TempDir::new().expect("tempdir");
    let settings = Settings {
        data_root: Some(dir.path().to_path_buf()),
        ..Settings::default()
    };
    let root = DataRoot::resolve(&settings).expect("resolve");
    assert_eq!(root.root(), dir.path());
}
