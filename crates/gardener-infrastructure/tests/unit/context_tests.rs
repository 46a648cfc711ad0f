use gardener_domain::entities::MessageRole;
use gardener_infrastructure::ContextManager;
use tempfile::TempDir;

use super::common::data_root;

#[test]
fn test_get_creates_empty_context() {
    let dir = TempDir::new().expect("tempdir");
    let manager = ContextManager::new(data_root(&dir), 8, 200);

    let context = manager.get("p1").expect("get");
    assert_eq!(context.project_id, "p1");
    assert!(context.messages.is_empty());
}

#[test]
fn test_add_message_persists_write_through() {
    let dir = TempDir::new().expect("tempdir");
    let paths = data_root(&dir);
    let manager = ContextManager::new(paths.clone(), 8, 200);

    manager
        .add_message("p1", MessageRole::User, "hello", None)
        .expect("add");
    assert!(paths.project_context_file("p1").exists());

    // A fresh manager over the same root reloads the history.
    let manager = ContextManager::new(paths, 8, 200);
    let recent = manager.recent("p1", 10).expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].content, "hello");
}

#[test]
fn test_lru_eviction_persists_victim() {
    let dir = TempDir::new().expect("tempdir");
    let paths = data_root(&dir);
    let manager = ContextManager::new(paths.clone(), 2, 200);

    manager
        .add_message("p1", MessageRole::User, "first", None)
        .expect("add");
    manager
        .add_message("p2", MessageRole::User, "second", None)
        .expect("add");
    assert_eq!(manager.resident_count(), 2);

    // Touch p1 so p2 becomes the LRU victim when p3 arrives.
    manager.get("p1").expect("touch");
    manager
        .add_message("p3", MessageRole::User, "third", None)
        .expect("add");

    assert_eq!(manager.resident_count(), 2);
    assert!(paths.project_context_file("p2").exists());

    // The evicted context is transparently reloaded on access.
    let recent = manager.recent("p2", 10).expect("reload");
    assert_eq!(recent[0].content, "second");
}

#[test]
fn test_retention_cap_drops_oldest_preserving_system() {
    let dir = TempDir::new().expect("tempdir");
    let manager = ContextManager::new(data_root(&dir), 8, 4);

    manager
        .add_message("p1", MessageRole::System, "analysis completed", None)
        .expect("add");
    for i in 0..6 {
        manager
            .add_message("p1", MessageRole::User, &format!("q{i}"), None)
            .expect("add");
    }

    let messages = manager.recent("p1", 100).expect("recent");
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, MessageRole::System);
    assert_eq!(messages[3].content, "q5");
}

#[test]
fn test_recent_returns_chronological_tail() {
    let dir = TempDir::new().expect("tempdir");
    let manager = ContextManager::new(data_root(&dir), 8, 200);

    for i in 0..5 {
        manager
            .add_message("p1", MessageRole::User, &format!("m{i}"), None)
            .expect("add");
    }
    let tail = manager.recent("p1", 2).expect("recent");
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].content, "m3");
    assert_eq!(tail[1].content, "m4");
}

#[test]
fn test_clear_erases_memory_and_disk() {
    let dir = TempDir::new().expect("tempdir");
    let paths = data_root(&dir);
    let manager = ContextManager::new(paths.clone(), 8, 200);

    manager
        .add_message("p1", MessageRole::User, "hello", None)
        .expect("add");
    manager.clear("p1").expect("clear");

    assert!(!paths.project_context_file("p1").exists());
    assert!(manager.recent("p1", 10).expect("recent").is_empty());
}

#[test]
fn test_set_state_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let paths = data_root(&dir);
    let manager = ContextManager::new(paths.clone(), 8, 200);

    manager
        .set_state("p1", "file_count", serde_json::json!(42))
        .expect("set state");

    let manager = ContextManager::new(paths, 8, 200);
    let context = manager.get("p1").expect("get");
    assert_eq!(context.analysis_state.get("file_count"), Some(&serde_json::json!(42)));
}

#[test]
fn test_concurrent_appends_are_totally_ordered() {
    let dir = TempDir::new().expect("tempdir");
    let paths = data_root(&dir);
    let manager = std::sync::Arc::new(ContextManager::new(paths.clone(), 8, 500));

    let mut handles = Vec::new();
    for worker in 0..4 {
        let manager = std::sync::Arc::clone(&manager);
        handles.push(std::thread::spawn(move || {
            for i in 0..25 {
                manager
                    .add_message("p1", MessageRole::User, &format!("w{worker}-{i}"), None)
                    .expect("add");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("join");
    }

    let messages = manager.recent("p1", 1000).expect("recent");
    assert_eq!(messages.len(), 100, "all appends retained");
    for pair in messages.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp, "append order kept");
    }

    // And all of them made it to disk.
    let manager = ContextManager::new(paths, 8, 500);
    assert_eq!(manager.recent("p1", 1000).expect("recent").len(), 100);
}
