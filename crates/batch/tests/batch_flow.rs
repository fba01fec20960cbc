use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use themeshift_batch::{BatchOptions, BatchRunner, FileStatus};
use themeshift_rewrite::{RewriteEngine, RewriteWarning};

const STALE: &str = "Widget build(BuildContext context) {\n  return const Divider(color: Color(0xFFEEEEEE));\n}\n";
const MIGRATED: &str = "Widget build(BuildContext context) {\n  return Divider(color: context.cs.outline);\n}\n";
const CLEAN: &str = "Widget build(BuildContext context) {\n  return const SizedBox();\n}\n";

fn engine() -> RewriteEngine {
    RewriteEngine::builtin().expect("engine")
}

#[test]
fn failure_in_one_file_does_not_stop_the_others() {
    let dir = tempdir().unwrap();
    let stale = dir.path().join("stale.dart");
    let clean = dir.path().join("clean.dart");
    let missing = dir.path().join("missing.dart");
    fs::write(&stale, STALE).unwrap();
    fs::write(&clean, CLEAN).unwrap();

    let engine = engine();
    let report = BatchRunner::new(&engine, BatchOptions::default()).run(&[
        stale.clone(),
        missing.clone(),
        clean.clone(),
    ]);

    let statuses: Vec<(PathBuf, FileStatus)> = report
        .files
        .iter()
        .map(|f| (f.path.clone(), f.status.clone()))
        .collect();
    assert_eq!(statuses[0], (stale.clone(), FileStatus::Changed { replacements: 2 }));
    assert!(matches!(statuses[1], (ref p, FileStatus::Failed { .. }) if *p == missing));
    assert_eq!(statuses[2], (clean.clone(), FileStatus::Unchanged));

    assert_eq!(fs::read_to_string(&stale).unwrap(), MIGRATED);
    assert_eq!(fs::read_to_string(&clean).unwrap(), CLEAN);
    assert_eq!((report.changed, report.unchanged, report.failed), (1, 1, 1));
    assert!(!report.is_success());
}

#[test]
fn dry_run_reports_changes_without_writing() {
    let dir = tempdir().unwrap();
    let stale = dir.path().join("stale.dart");
    fs::write(&stale, STALE).unwrap();

    let engine = engine();
    let options = BatchOptions {
        dry_run: true,
        ..BatchOptions::default()
    };
    let report = BatchRunner::new(&engine, options).run(&[stale.clone()]);

    assert!(report.dry_run);
    assert!(report.has_changes());
    assert!(report.is_success());
    assert_eq!(fs::read_to_string(&stale).unwrap(), STALE);
}

#[test]
fn second_batch_over_migrated_files_is_unchanged() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..8)
        .map(|i| {
            let path = dir.path().join(format!("w{i}.dart"));
            fs::write(&path, STALE).unwrap();
            path
        })
        .collect();

    let engine = engine();
    let first = BatchRunner::new(&engine, BatchOptions::default()).run(&paths);
    assert_eq!(first.changed, 8);

    let sequential = BatchOptions {
        parallel: false,
        ..BatchOptions::default()
    };
    let second = BatchRunner::new(&engine, sequential).run(&paths);
    assert_eq!(second.unchanged, 8);
    assert_eq!(second.replacements, 0);
    for path in &paths {
        assert_eq!(fs::read_to_string(path).unwrap(), MIGRATED);
    }
}

#[test]
fn warnings_are_attached_to_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.dart");
    let filler = "    Text('x'),\n".repeat(10);
    let text = format!(
        "Widget build(BuildContext context) {{\n  final items = const [\n{filler}    Icon(color: context.cs.outline),\n"
    );
    fs::write(&path, &text).unwrap();

    let engine = engine();
    let report = BatchRunner::new(&engine, BatchOptions::default()).run(&[path.clone()]);

    assert_eq!(report.files[0].status, FileStatus::Unchanged);
    assert!(matches!(
        report.files[0].warnings.as_slice(),
        [RewriteWarning::UnterminatedBlock { line: 2, .. }]
    ));
    assert!(!report.is_success());
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}
