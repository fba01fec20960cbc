use themeshift_batch::{BatchReport, FileStatus};

/// Plain-text report: one line per changed or failed file, then a summary
pub fn render_summary(report: &BatchReport) -> String {
    let mut out = String::new();
    let verb = if report.dry_run {
        "would change"
    } else {
        "changed"
    };

    for file in &report.files {
        match &file.status {
            FileStatus::Changed { replacements } => out.push_str(&format!(
                "{verb}: {} ({replacements} replacements)\n",
                file.path.display()
            )),
            FileStatus::Unchanged => {}
            FileStatus::Failed { reason } => out.push_str(&format!("failed: {reason}\n")),
        }
        for warning in &file.warnings {
            out.push_str(&format!("warning: {}: {warning}\n", file.path.display()));
        }
    }

    out.push_str(&format!(
        "{} {verb}, {} unchanged, {} failed, {} warnings ({} ms)\n",
        report.changed, report.unchanged, report.failed, report.warnings, report.elapsed_ms
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use themeshift_batch::FileReport;
    use themeshift_rewrite::RewriteWarning;

    #[test]
    fn lists_changed_failed_and_warnings() {
        let mut report = BatchReport::new(true);
        report.add_file(FileReport {
            path: PathBuf::from("lib/a.dart"),
            status: FileStatus::Changed { replacements: 4 },
            warnings: vec![],
        });
        report.add_file(FileReport {
            path: PathBuf::from("lib/b.dart"),
            status: FileStatus::Unchanged,
            warnings: vec![RewriteWarning::UnterminatedBlock {
                offset: 10,
                line: 3,
            }],
        });
        report.add_file(FileReport::failed(
            PathBuf::from("lib/c.dart"),
            "failed to read lib/c.dart: not found",
        ));

        let text = render_summary(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "would change: lib/a.dart (4 replacements)");
        assert!(lines[1].starts_with("warning: lib/b.dart: line 3:"));
        assert_eq!(lines[2], "failed: failed to read lib/c.dart: not found");
        assert!(lines[3].starts_with("1 would change, 1 unchanged, 1 failed, 1 warnings"));
    }
}
