use dupedetector::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy};
use dupedetector::output::Report;
use dupedetector::scanner::HardlinkTracker;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(root: &Path, min_size: u64) -> Report {
    let stats = DuplicateFinder::new(
        FinderConfig::default()
            .with_min_size(min_size)
            .with_keep_strategy(KeepStrategy::Shortest),
    )
    .find_duplicates(root)
    .unwrap();
    Report::build(&stats, root, KeepStrategy::Shortest)
}

#[test]
fn test_hardlink_of_keeper_frees_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let content = [0xabu8; 100];
    let mut other = [0xabu8; 100];
    other[0] = 0;

    fs::create_dir(root.join("copy")).unwrap();
    fs::write(root.join("x.bin"), content).unwrap();
    fs::write(root.join("copy/x.bin"), content).unwrap();
    fs::write(root.join("y.bin"), other).unwrap();
    if let Err(e) = fs::hard_link(root.join("x.bin"), root.join("link.bin")) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let report = run(root, 10);

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.keeper.path, root.join("x.bin"));
    assert_eq!(group.file_size, 100);

    if HardlinkTracker::is_supported() {
        assert_eq!(group.hardlinks, vec![root.join("link.bin")]);
        assert_eq!(group.victims.len(), 1);
        assert_eq!(group.victims[0].path, root.join("copy/x.bin"));
        assert_eq!(report.summary.bytes_saved, 100);
        assert_eq!(report.summary.total_hard_links, 1);
    } else {
        // Without identity support every extra copy counts.
        assert_eq!(group.victims.len(), 2);
        assert_eq!(report.summary.bytes_saved, 200);
    }

    let all_paths: Vec<_> = std::iter::once(&group.keeper.path)
        .chain(group.hardlinks.iter())
        .chain(group.victims.iter().map(|v| &v.path))
        .collect();
    assert!(!all_paths.contains(&&root.join("y.bin")));
}

#[test]
fn test_hardlink_only_group_has_no_victims() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("original.txt"), b"identical content").unwrap();
    if let Err(e) = fs::hard_link(root.join("original.txt"), root.join("hardlink.txt")) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }
    if !HardlinkTracker::is_supported() {
        return;
    }

    let report = run(root, 1);

    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].victims.is_empty());
    assert_eq!(report.summary.total_duplicates, 0);
    assert_eq!(report.summary.bytes_saved, 0);
}

#[test]
fn test_hardlinked_pair_of_victims_counted_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a"), b"pair content").unwrap();
    fs::write(root.join("bb"), b"pair content").unwrap();
    if fs::hard_link(root.join("bb"), root.join("ccc")).is_err() || !HardlinkTracker::is_supported()
    {
        return;
    }

    let report = run(root, 1);
    let group = &report.groups[0];

    assert_eq!(group.keeper.path, root.join("a"));
    assert_eq!(group.victims.len(), 1);
    assert_eq!(group.victims[0].path, root.join("bb"));
    assert_eq!(group.hardlinks, vec![root.join("ccc")]);
    assert_eq!(report.summary.bytes_saved, 12);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("original.txt"), b"symlink target").unwrap();
    std::os::unix::fs::symlink(root.join("original.txt"), root.join("symlink.txt")).unwrap();

    let stats = DuplicateFinder::new(FinderConfig::default().with_min_size(1))
        .find_duplicates(root)
        .unwrap();

    assert_eq!(stats.total_files_scanned, 1);
    assert!(stats.hash_groups.is_empty());
}
