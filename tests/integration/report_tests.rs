use dupedetector::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy};
use dupedetector::output::{JsonOutput, Report, ScriptOutput, TextOutput};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn report_for(root: &Path) -> Report {
    let stats = DuplicateFinder::new(FinderConfig::default().with_min_size(1))
        .find_duplicates(root)
        .unwrap();
    Report::build(&stats, root, KeepStrategy::Shortest)
}

fn setup(root: &Path) {
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("small.txt"), b"tiny").unwrap();
    fs::write(root.join("sub/small.txt"), b"tiny").unwrap();
    fs::write(root.join("big.bin"), vec![9u8; 5000]).unwrap();
    fs::write(root.join("sub/big.bin"), vec![9u8; 5000]).unwrap();
    fs::write(root.join("sub/big copy's.bin"), vec![9u8; 5000]).unwrap();
}

#[test]
fn test_json_report_structure() {
    let dir = tempdir().unwrap();
    setup(dir.path());
    let report = report_for(dir.path());

    let json = JsonOutput::new(&report).to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["metadata"]["strategy"], "shortest");
    assert!(value["metadata"]["timestamp"].is_string());
    assert_eq!(value["summary"]["total_files_scanned"], 5);
    assert_eq!(value["summary"]["total_duplicates"], 3);
    assert_eq!(value["summary"]["bytes_saved"], 10_004);

    let groups = value["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    // Largest first.
    assert_eq!(groups[0]["file_size"], 5000);
    assert_eq!(groups[1]["file_size"], 4);
    assert_eq!(groups[0]["hash"].as_str().unwrap().len(), 16);
    assert_eq!(groups[0]["victims"].as_array().unwrap().len(), 2);
}

#[test]
fn test_script_escapes_quotes() {
    let dir = tempdir().unwrap();
    setup(dir.path());
    let report = report_for(dir.path());

    let mut buf = Vec::new();
    ScriptOutput::new(&report).write_to(&mut buf).unwrap();
    let script = String::from_utf8(buf).unwrap();

    assert_eq!(script.matches("rm -v ").count(), 3);
    assert!(script.contains("big copy'\\''s.bin'"));
    assert_eq!(script.matches("# Group Hash: ").count(), 2);
}

#[test]
fn test_text_listing_mentions_every_candidate() {
    let dir = tempdir().unwrap();
    setup(dir.path());
    let report = report_for(dir.path());

    let mut buf = Vec::new();
    TextOutput::new(&report, true).write_to(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert_eq!(text.matches("[candidate]").count(), 3);
    assert!(text.contains("Scanned 5 files"));
}
