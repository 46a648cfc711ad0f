use gardener_domain::error::Error;

#[test]
fn test_user_errors_exit_code_one() {
    assert_eq!(Error::user("bad path").exit_code(), 1);
    assert_eq!(Error::not_found("project x").exit_code(), 1);
}

#[test]
fn test_runtime_errors_exit_code_two() {
    assert_eq!(Error::capability("rag_retrieval", "no embedder").exit_code(), 2);
    assert_eq!(Error::resource_exhausted("adapter memory", 10, 5).exit_code(), 2);
    assert_eq!(Error::llm_unavailable("connection refused").exit_code(), 2);
    assert_eq!(Error::persistence("rename failed").exit_code(), 2);
}

#[test]
fn test_capability_predicate() {
    assert!(Error::capability("x", "y").is_capability_unavailable());
    assert!(!Error::user("x").is_capability_unavailable());
}

#[test]
fn test_display_messages() {
    let err = Error::capability("training_pipeline", "runtime not installed");
    assert_eq!(
        err.to_string(),
        "capability 'training_pipeline' unavailable: runtime not installed"
    );

    let err = Error::resource_exhausted("adapter memory", 2_000_000, 1_000_000);
    assert!(err.to_string().contains("requested 2000000"));
    assert!(err.to_string().contains("budget 1000000"));

    let err = Error::LlmTimeout { elapsed_secs: 120 };
    assert_eq!(err.to_string(), "LLM request timed out after 120s");
}

#[test]
fn test_io_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_ingest_error_carries_path() {
    let err = Error::ingest("src/broken.py", "syntax error at line 3");
    assert!(err.to_string().contains("src/broken.py"));
    assert_eq!(err.exit_code(), 2);
}
