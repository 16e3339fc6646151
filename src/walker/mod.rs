//! Source tree traversal: decides which files are worth handing to the
//! rule engine.

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

use crate::context::FileKind;
use crate::error::Result;

/// Files beyond this size are skipped; minified bundles and vendored blobs
/// produce noise, not findings.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Directories that never contain first-party mobile source.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "build",
    "dist",
    "coverage",
    "Pods",
    "vendor",
    ".expo",
    "DerivedData",
    "__snapshots__",
];

fn in_excluded_dir(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|name| DEFAULT_EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
    })
}

fn matches_exclude_glob(path: &Path, patterns: &[Pattern]) -> bool {
    let text = path.to_string_lossy();
    patterns.iter().any(|p| p.matches(&text))
}

/// Walks `root` and returns every scannable file in deterministic (sorted)
/// order. Respects .gitignore, skips hidden entries, default-excluded
/// directories, oversized files, and anything the policy's exclude globs
/// match. Files of no recognized kind are dropped here rather than handed
/// to every rule.
pub fn collect_files(root: &Path, exclude_globs: &[String]) -> Result<Vec<PathBuf>> {
    let patterns: Vec<Pattern> = exclude_globs
        .iter()
        .filter_map(|g| match Pattern::new(g) {
            Ok(p) => Some(p),
            Err(err) => {
                tracing::warn!(glob = %g, error = %err, "ignoring malformed exclude glob");
                None
            }
        })
        .collect();

    let mut files = Vec::new();
    let walk = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .follow_links(false)
        .build();

    for entry in walk {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if in_excluded_dir(path) || matches_exclude_glob(path, &patterns) {
            continue;
        }
        if FileKind::classify(path) == FileKind::Inert {
            continue;
        }
        match entry.metadata() {
            Ok(meta) if meta.len() > MAX_FILE_SIZE => {
                tracing::debug!(path = %path.display(), size = meta.len(), "skipping oversized file");
                continue;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
