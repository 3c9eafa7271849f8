use dupedetector::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// 2020-01-01T00:00:00Z and 2024-01-01T00:00:00Z
const JAN_2020: i64 = 1_577_836_800;
const JAN_2024: i64 = 1_704_067_200;

fn write_at(root: &Path, rel: &str, content: &[u8], unix_secs: i64) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    set_file_mtime(&path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
    path
}

fn keeper(root: &Path, strategy: KeepStrategy) -> PathBuf {
    let stats = DuplicateFinder::new(
        FinderConfig::default()
            .with_min_size(1)
            .with_keep_strategy(strategy),
    )
    .find_duplicates(root)
    .unwrap();
    assert_eq!(stats.hash_groups.len(), 1);
    stats.hash_groups[0].files[0].path.clone()
}

#[test]
fn test_newest_wins_regardless_of_path_length() {
    let dir = tempdir().unwrap();
    let old = write_at(dir.path(), "a.txt", b"same bytes", JAN_2020);
    let new = write_at(dir.path(), "very/deeply/nested/copy.txt", b"same bytes", JAN_2024);

    assert_eq!(keeper(dir.path(), KeepStrategy::Newest), new);
    assert_eq!(keeper(dir.path(), KeepStrategy::Oldest), old);
}

#[test]
fn test_path_length_strategies() {
    let dir = tempdir().unwrap();
    let short = write_at(dir.path(), "s.txt", b"length test", JAN_2024);
    let long = write_at(dir.path(), "longer/name.txt", b"length test", JAN_2020);

    assert_eq!(keeper(dir.path(), KeepStrategy::Shortest), short);
    assert_eq!(keeper(dir.path(), KeepStrategy::Longest), long);
}

#[test]
fn test_equal_mtime_falls_back_to_shorter_path() {
    let dir = tempdir().unwrap();
    write_at(dir.path(), "dir/abc.txt", b"tie", JAN_2020);
    let short = write_at(dir.path(), "abc.txt", b"tie", JAN_2020);

    assert_eq!(keeper(dir.path(), KeepStrategy::Newest), short);
    assert_eq!(keeper(dir.path(), KeepStrategy::Oldest), short);
}

#[test]
fn test_equal_length_falls_back_to_lexicographic() {
    let dir = tempdir().unwrap();
    write_at(dir.path(), "b.txt", b"lexi", JAN_2020);
    let first = write_at(dir.path(), "a.txt", b"lexi", JAN_2020);
    write_at(dir.path(), "c.txt", b"lexi", JAN_2020);

    assert_eq!(keeper(dir.path(), KeepStrategy::Shortest), first);
    assert_eq!(keeper(dir.path(), KeepStrategy::Longest), first);
    assert_eq!(keeper(dir.path(), KeepStrategy::Newest), first);
}
