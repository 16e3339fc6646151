//! Drives a scan: walks the tree, builds per-file context, runs the
//! applicable rules, and folds the findings into a [`ScanResult`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;

use crate::config::Policy;
use crate::context::RuleContext;
use crate::error::{Result, ScanError};
use crate::rules::{Registry, ScanResult};
use crate::suppress;
use crate::walker;

pub struct Engine {
    registry: Registry,
    policy: Policy,
}

/// An existing root that cannot be opened would otherwise walk to an empty
/// file list and report a clean scan.
fn root_is_readable(root: &Path) -> bool {
    if root.is_dir() {
        std::fs::read_dir(root).is_ok()
    } else {
        std::fs::File::open(root).is_ok()
    }
}

impl Engine {
    pub fn new(policy: Policy) -> Self {
        Self {
            registry: Registry::with_builtin_rules(),
            policy,
        }
    }

    #[cfg(test)]
    pub fn with_registry(registry: Registry, policy: Policy) -> Self {
        Self { registry, policy }
    }

    /// Scans the tree rooted at `root`. A missing or unreadable target is
    /// fatal; unreadable individual files only degrade the run.
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        if !root.exists() || !root_is_readable(root) {
            return Err(ScanError::TargetNotFound(root.display().to_string()));
        }
        let files = walker::collect_files(root, &self.policy.exclude_paths)?;
        Ok(self.scan_files(&files))
    }

    /// Runs the rule set over an explicit file list. Rule failures are
    /// logged and isolated so one misbehaving rule cannot sink the scan.
    pub fn scan_files(&self, files: &[PathBuf]) -> ScanResult {
        let started = Instant::now();
        let mut findings = Vec::new();
        let mut files_scanned = 0usize;
        let mut files_skipped = 0usize;

        for path in files {
            let ctx = match RuleContext::build(path) {
                Ok(ctx) => ctx,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable file");
                    files_skipped += 1;
                    continue;
                }
            };
            files_scanned += 1;

            let mut file_findings = Vec::new();
            for rule in self
                .registry
                .applicable_rules(path, &self.policy.ignore_rules)
            {
                match rule.check(&ctx) {
                    Ok(rule_findings) => file_findings.extend(rule_findings),
                    Err(err) => {
                        tracing::warn!(
                            rule = rule.metadata().id,
                            path = %path.display(),
                            error = %err,
                            "rule failed; continuing"
                        );
                    }
                }
            }
            findings.extend(suppress::filter_debug_findings(
                file_findings,
                path,
                &ctx.content,
            ));
        }

        let mut ignored_rules: Vec<String> = self.policy.ignore_rules.iter().cloned().collect();
        ignored_rules.sort();

        ScanResult {
            findings,
            files_scanned,
            files_skipped,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
            ignored_rules,
        }
    }
}
