use std::path::Path;

use gardener_domain::entities::Language;
use gardener_infrastructure::services::{DiscoveryOptions, SKIP_DIRS, discover};
use rstest::rstest;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, content).expect("write");
}

#[test]
fn test_discovers_source_files_with_metadata() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "main.py", "print('hi')\n");
    write(dir.path(), "src/util.ts", "export const x = 1;\n");
    write(dir.path(), "README.md", "# readme\n");

    let files = discover(dir.path(), &DiscoveryOptions::default(), |_| {}).expect("discover");
    assert_eq!(files.len(), 2, "non-source files are filtered");

    let python = files
        .iter()
        .find(|f| f.language == Language::Python)
        .expect("python file");
    assert!(python.size > 0);
    assert!(python.mtime.is_some());
}

#[rstest]
#[case("node_modules")]
#[case(".git")]
#[case("__pycache__")]
#[case("venv")]
#[case("target")]
#[case("build")]
#[case("dist")]
#[case(".cache")]
#[case(".idea")]
#[case(".vscode")]
fn test_builtin_exclusions_gate_descent(#[case] excluded: &str) {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "keep.py", "x = 1\n");
    write(
        dir.path(),
        &format!("{excluded}/buried/deep/hidden.py"),
        "x = 2\n",
    );

    let files = discover(dir.path(), &DiscoveryOptions::default(), |_| {}).expect("discover");
    assert_eq!(files.len(), 1);
    // The property: no emitted path has any excluded directory component.
    for file in &files {
        for component in file.path.components() {
            let name = component.as_os_str().to_string_lossy();
            assert!(!SKIP_DIRS.contains(&name.as_ref()), "leaked {name}");
        }
    }
}

#[test]
fn test_caller_exclusions_apply_during_traversal() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "keep.py", "x = 1\n");
    write(dir.path(), "generated/out.py", "x = 2\n");

    let options = DiscoveryOptions {
        exclude_dirs: vec!["generated".to_owned()],
        ..DiscoveryOptions::default()
    };
    let files = discover(dir.path(), &options, |_| {}).expect("discover");
    assert_eq!(files.len(), 1);
    assert!(files[0].path.ends_with("keep.py"));
}

#[test]
fn test_extension_filter_override() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "a.py", "x = 1\n");
    write(dir.path(), "b.rs", "fn main() {}\n");

    let options = DiscoveryOptions {
        extensions: vec!["py".to_owned()],
        ..DiscoveryOptions::default()
    };
    let files = discover(dir.path(), &options, |_| {}).expect("discover");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].language, Language::Python);
}

#[test]
fn test_progress_callback_cadence() {
    let dir = TempDir::new().expect("tempdir");
    for i in 0..25 {
        write(dir.path(), &format!("f{i:02}.py"), "x = 1\n");
    }

    let options = DiscoveryOptions {
        progress_every: 10,
        ..DiscoveryOptions::default()
    };
    let mut ticks = Vec::new();
    discover(dir.path(), &options, |count| ticks.push(count)).expect("discover");
    assert_eq!(ticks, vec![10, 20]);
}

#[test]
fn test_empty_directory_yields_no_files() {
    let dir = TempDir::new().expect("tempdir");
    let files = discover(dir.path(), &DiscoveryOptions::default(), |_| {}).expect("discover");
    assert!(files.is_empty());
}

#[test]
fn test_missing_root_is_a_user_error() {
    let err = discover(
        Path::new("/definitely/not/a/directory"),
        &DiscoveryOptions::default(),
        |_| {},
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_unknown_language_files_are_counted() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "lib.rs", "fn main() {}\n");
    write(dir.path(), "app.py", "x = 1\n");

    let files = discover(dir.path(), &DiscoveryOptions::default(), |_| {}).expect("discover");
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.language == Language::Unknown));
}
