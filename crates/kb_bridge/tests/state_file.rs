use std::fs;

use kb_bridge::StateFile;
use tempfile::TempDir;

#[test]
fn missing_file_reads_as_none() {
    let temp = TempDir::new().unwrap();
    let file = StateFile::new(temp.path().join(".kb_state.ron"));
    assert_eq!(file.read().unwrap(), None);
}

#[test]
fn write_replaces_existing_contents() {
    let temp = TempDir::new().unwrap();
    let file = StateFile::new(temp.path().join(".kb_state.ron"));

    file.write("(page_size: 20)").unwrap();
    assert_eq!(file.read().unwrap().as_deref(), Some("(page_size: 20)"));

    file.write("(page_size: 50)").unwrap();
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "(page_size: 50)");
}

#[test]
fn missing_parent_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let file = StateFile::new(temp.path().join("nested/dir/state.ron"));
    file.write("()").unwrap();
    assert!(file.path().is_file());
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let file = StateFile::new(blocker.join("state.ron"));
    assert!(file.write("()").is_err());
    assert!(!file.path().exists());
}
