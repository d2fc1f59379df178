use broker_fs::{NormalizedPath, RobustnessConfig, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("TRIAL.env"));

    io::write_atomic(&path, b"SAP_URL=https://a", RobustnessConfig::default()).unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "SAP_URL=https://a");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("TRIAL.env");
    fs::write(&file_path, "original").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_text(&path, "updated").unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "updated");
}

#[test]
fn test_write_atomic_without_fsync() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("TRIAL.json"));
    let config = RobustnessConfig {
        enable_fsync: false,
        ..RobustnessConfig::default()
    };

    io::write_atomic(&path, b"{}", config).unwrap();
    assert_eq!(io::read_text(&path).unwrap(), "{}");
}

#[test]
fn test_interrupted_write_leaves_old_content() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("TRIAL.env");
    fs::write(&file_path, "SAP_URL=https://old").unwrap();

    // Simulate a crash after the temp write but before the rename.
    fs::write(temp.path().join("TRIAL.env.tmp"), "SAP_URL=https://ne").unwrap();

    let path = NormalizedPath::new(&file_path);
    assert_eq!(io::read_text(&path).unwrap(), "SAP_URL=https://old");

    // The next successful write replaces the stale temp file.
    io::write_text(&path, "SAP_URL=https://new").unwrap();
    assert_eq!(io::read_text(&path).unwrap(), "SAP_URL=https://new");
    assert!(!temp.path().join("TRIAL.env.tmp").exists());
}

#[test]
fn test_read_text_optional_missing_is_none() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.env"));
    assert_eq!(io::read_text_optional(&path).unwrap(), None);
}

#[test]
fn test_read_text_nonexistent_file_is_not_found() {
    let path = NormalizedPath::new("/nonexistent/file.env");
    let err = io::read_text(&path).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_remove_file_if_exists() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("TRIAL.env"));
    io::write_text(&path, "X=1").unwrap();

    assert!(io::remove_file_if_exists(&path).unwrap());
    assert!(!io::remove_file_if_exists(&path).unwrap());
}

#[test]
fn test_remove_atomic_takes_lock_sidecar() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("TRIAL.env"));
    io::write_text(&path, "X=1").unwrap();
    assert!(temp.path().join("TRIAL.env.lock").exists());

    assert!(io::remove_atomic(&path).unwrap());
    assert!(!temp.path().join("TRIAL.env").exists());
    assert!(!temp.path().join("TRIAL.env.lock").exists());
    assert!(!io::remove_atomic(&path).unwrap());
}

#[test]
fn test_ensure_dir_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let dir = NormalizedPath::new(temp.path().join("a/b"));
    io::ensure_dir(&dir).unwrap();
    io::ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
}
