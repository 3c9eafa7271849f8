use clap::Parser;
use dupedetector::cli::Cli;
use dupedetector::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupedetector", "-q"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn setup(root: &Path) {
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::write(root.join("a.txt"), b"action content").unwrap();
    fs::write(root.join("nested/a.txt"), b"action content").unwrap();
    fs::write(root.join("unique.txt"), b"only one of these").unwrap();
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = tempdir().unwrap();
    setup(dir.path());

    let code = dupedetector::run_app(cli(&[dir.path().to_str().unwrap(), "-m", "1"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("nested/a.txt").exists());
}

#[test]
fn test_trash_moves_victims_only() {
    let dir = tempdir().unwrap();
    let scan_root = dir.path().join("data");
    let trash = dir.path().join("bin");
    setup(&scan_root);

    let code = dupedetector::run_app(cli(&[
        scan_root.to_str().unwrap(),
        "-m",
        "1",
        "--trash",
        "--trash-dir",
        trash.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(scan_root.join("a.txt").exists());
    assert!(!scan_root.join("nested/a.txt").exists());
    assert!(scan_root.join("unique.txt").exists());

    let trashed: Vec<_> = fs::read_dir(&trash).unwrap().collect();
    assert_eq!(trashed.len(), 1);
    let entry = trashed[0].as_ref().unwrap();
    assert!(entry.file_name().to_string_lossy().starts_with("a_"));
    assert_eq!(fs::read(entry.path()).unwrap(), b"action content");
}

#[test]
fn test_delete_removes_victims() {
    let dir = tempdir().unwrap();
    setup(dir.path());

    let code = dupedetector::run_app(cli(&[
        dir.path().to_str().unwrap(),
        "-m",
        "1",
        "--delete",
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("nested/a.txt").exists());
}

#[test]
fn test_output_script_written_and_nothing_deleted() {
    let dir = tempdir().unwrap();
    let scan_root = dir.path().join("data");
    let script = dir.path().join("cleanup.sh");
    setup(&scan_root);

    let code = dupedetector::run_app(cli(&[
        scan_root.to_str().unwrap(),
        "-m",
        "1",
        "-o",
        script.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(scan_root.join("nested/a.txt").exists());

    let content = fs::read_to_string(&script).unwrap();
    assert!(content.starts_with("#!/bin/sh"));
    let victim = scan_root.join("nested/a.txt");
    assert!(content.contains(&format!("rm -v '{}'", victim.display())));
    let keeper = scan_root.join("a.txt");
    assert!(!content.contains(&format!("rm -v '{}'", keeper.display())));
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), b"one").unwrap();
    fs::write(dir.path().join("two.txt"), b"two!").unwrap();

    let code = dupedetector::run_app(cli(&[
        dir.path().to_str().unwrap(),
        "-m",
        "1",
        "--delete",
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(dir.path().join("one.txt").exists());
}

#[test]
fn test_default_min_size_skips_small_files() {
    let dir = tempdir().unwrap();
    setup(dir.path());

    let code = dupedetector::run_app(cli(&[dir.path().to_str().unwrap()])).unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
}
