use dupedetector::duplicates::{
    phase2_prehash, phase3_fullhash, DuplicateFinder, FinderConfig, SizeGroup,
};
use dupedetector::scanner::{FileRecord, HashError, Hasher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::tempdir;

fn missing(name: &str) -> FileRecord {
    FileRecord::new(
        PathBuf::from(format!("nonexistent_{name}.txt")),
        100,
        SystemTime::now(),
    )
}

#[test]
fn test_prehash_continues_on_missing_files() {
    let mut groups = HashMap::new();
    groups.insert(
        100,
        SizeGroup {
            size: 100,
            files: vec![missing("1"), missing("2")],
        },
    );
    let hasher = Arc::new(Hasher::new());

    let (survivors, stats) = phase2_prehash(groups, &hasher, &FinderConfig::default());

    assert!(survivors.is_empty());
    assert_eq!(stats.input_files, 2);
    assert_eq!(stats.failed_files, 2);
    assert!(!stats.interrupted);
}

#[test]
fn test_fullhash_drops_vanished_file_and_keeps_rest() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    for path in [&a, &b, &c] {
        fs::write(path, b"survivor").unwrap();
    }
    let record = |p: &Path| FileRecord::new(p.to_path_buf(), 8, SystemTime::now());

    let mut prehash_groups = HashMap::new();
    prehash_groups.insert((8, 1), vec![record(&a), record(&b), record(&c)]);
    fs::remove_file(&c).unwrap();

    let hasher = Arc::new(Hasher::new());
    let (groups, stats) = phase3_fullhash(prehash_groups, &hasher, &FinderConfig::default());

    assert_eq!(stats.failed_files, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_fullhash_drops_file_whose_size_changed() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"12345678").unwrap();
    fs::write(&b, b"12345678 and then some").unwrap();
    let record = |p: &Path| FileRecord::new(p.to_path_buf(), 8, SystemTime::now());

    let mut prehash_groups = HashMap::new();
    prehash_groups.insert((8, 1), vec![record(&a), record(&b)]);

    let hasher = Arc::new(Hasher::new());
    let (groups, stats) = phase3_fullhash(prehash_groups, &hasher, &FinderConfig::default());

    assert_eq!(stats.size_changed, 1);
    assert!(groups.is_empty());
}

#[test]
fn test_hash_error_kinds() {
    let hasher = Hasher::new();
    let result = hasher.hash_file(Path::new("/definitely/not/here"));
    assert!(matches!(result, Err(HashError::NotFound(_))));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"readable copy").unwrap();
    fs::write(dir.path().join("b"), b"readable copy").unwrap();
    let locked = dir.path().join("c");
    fs::write(&locked, b"readable copy").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway.
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let stats = DuplicateFinder::new(FinderConfig::default().with_min_size(1))
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(stats.total_files_scanned, 3);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dir test").unwrap();
    fs::write(dir.path().join("b"), b"dir test").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c"), b"dir test").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let stats = DuplicateFinder::new(FinderConfig::default().with_min_size(1))
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(stats.skipped_entries >= 1);
    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].len(), 2);
}
