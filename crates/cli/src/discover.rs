use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Expand directories into matching files (.gitignore aware).
///
/// Plain file arguments pass through untouched, even when missing, so the
/// batch can report them. Duplicates are dropped, first occurrence wins.
pub fn expand_paths(paths: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for path in paths {
        let found = if path.is_dir() {
            walk(path, extensions)
        } else {
            vec![path.clone()]
        };
        for file in found {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    log::info!("Found {} files to process", files.len());
    files
}

fn walk(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false);

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let Some(file_type) = entry.file_type() else {
                    continue;
                };
                if !file_type.is_file() || !has_extension(entry.path(), extensions) {
                    continue;
                }
                files.push(entry.into_path());
            }
            Err(e) => log::warn!("Failed to read entry: {e}"),
        }
    }

    files.sort();
    log::debug!("{}: {} matching files", root.display(), files.len());
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}
