use dupedetector::duplicates::{DuplicateFinder, FinderConfig, FinderError, FinderOptions, KeepStrategy};
use dupedetector::scanner::ScanError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn finder(min_size: u64) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_min_size(min_size))
}

#[test]
fn test_nested_duplicates_found() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/one.txt", b"duplicate content here");
    write(dir.path(), "b/c/two.txt", b"duplicate content here");
    write(dir.path(), "d/e/f/three.txt", b"duplicate content here");
    write(dir.path(), "unique.txt", b"something else entirely");

    let stats = finder(1).find_duplicates(dir.path()).unwrap();

    assert_eq!(stats.total_files_scanned, 4);
    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].len(), 3);
    assert_eq!(stats.duplicate_count, 2);
    assert_eq!(stats.hash_groups[0].files[0].path, dir.path().join("a/one.txt"));
}

#[test]
fn test_min_size_is_inclusive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "exact1", &[7u8; 10]);
    write(dir.path(), "exact2", &[7u8; 10]);
    write(dir.path(), "small1", &[7u8; 9]);
    write(dir.path(), "small2", &[7u8; 9]);

    let stats = finder(10).find_duplicates(dir.path()).unwrap();

    assert_eq!(stats.total_files_scanned, 2);
    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].size, 10);
}

#[test]
fn test_different_sizes_never_grouped() {
    let dir = tempdir().unwrap();
    // Same prefix, different lengths.
    write(dir.path(), "short", b"abcdef");
    write(dir.path(), "long", b"abcdefg");
    write(dir.path(), "short2", b"abcdef");

    let stats = finder(1).find_duplicates(dir.path()).unwrap();

    assert_eq!(stats.hash_groups.len(), 1);
    for group in &stats.hash_groups {
        assert!(group.files.iter().all(|f| f.size == group.size));
    }
}

#[test]
fn test_empty_files_with_zero_min_size() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");

    let stats = finder(0).find_duplicates(dir.path()).unwrap();
    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].size, 0);

    let stats = finder(1).find_duplicates(dir.path()).unwrap();
    assert!(stats.hash_groups.is_empty());
    assert_eq!(stats.total_files_scanned, 0);
}

#[test]
fn test_large_files_spanning_many_blocks() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    write(dir.path(), "big1.bin", &data);
    write(dir.path(), "big2.bin", &data);
    let mut changed = data.clone();
    changed[150_000] ^= 0xff;
    write(dir.path(), "big3.bin", &changed);

    let stats = finder(1).find_duplicates(dir.path()).unwrap();

    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].len(), 2);
    assert_eq!(stats.candidates_after_prehash, 3);
}

#[test]
fn test_two_runs_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("set_a/{i}.dat"), b"alpha alpha alpha");
        write(dir.path(), &format!("set_b/deeper/{i}.dat"), b"bravo bravo bravo");
    }

    let first = finder(1).find_duplicates(dir.path()).unwrap();
    let second = finder(1).find_duplicates(dir.path()).unwrap();

    assert_eq!(first.hash_groups, second.hash_groups);
    assert_eq!(first.hash_groups.len(), 2);
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("d{}/f{}.bin", i % 4, i), format!("payload-{}", i % 3).as_bytes());
    }

    let single = DuplicateFinder::new(FinderConfig::default().with_min_size(1).with_workers(1))
        .find_duplicates(dir.path())
        .unwrap();
    let many = DuplicateFinder::new(FinderConfig::default().with_min_size(1).with_workers(8))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(single.hash_groups, many.hash_groups);
    assert_eq!(single.duplicate_count, 17);
}

#[test]
fn test_paranoid_mode_confirms_groups() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"paranoid check content");
    write(dir.path(), "b", b"paranoid check content");

    let stats = DuplicateFinder::new(FinderConfig::default().with_min_size(1).with_paranoid(true))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(stats.hash_groups.len(), 1);
    assert_eq!(stats.hash_groups[0].len(), 2);
}

#[test]
fn test_run_with_core_options() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x/a.txt", b"core options");
    write(dir.path(), "b.txt", b"core options");

    let stats = DuplicateFinder::run(
        dir.path(),
        FinderOptions {
            min_size: 1,
            excluded_dirs: Default::default(),
            keep_strategy: KeepStrategy::Longest,
        },
    )
    .unwrap();

    assert_eq!(stats.hash_groups[0].files[0].path, dir.path().join("x/a.txt"));
}

#[test]
fn test_nonexistent_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let result = finder(1).find_duplicates(&missing);
    assert!(matches!(
        result,
        Err(FinderError::Scan(ScanError::NotFound(_)))
    ));
}

#[test]
fn test_shutdown_before_run_interrupts() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"interrupted");
    write(dir.path(), "b", b"interrupted");

    let flag = Arc::new(AtomicBool::new(true));
    let result = DuplicateFinder::new(
        FinderConfig::default()
            .with_min_size(1)
            .with_shutdown_flag(flag),
    )
    .find_duplicates(dir.path());

    assert!(matches!(result, Err(FinderError::Interrupted)));
}
