use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A security finding produced by a detection rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Stable rule identifier (e.g., "HARDCODED_ENCRYPTION_KEY").
    pub rule_id: String,
    /// Human-readable statement of what was found.
    pub description: String,
    /// Severity level, fixed per rule at authoring time.
    pub severity: Severity,
    /// Path of the source file the finding was anchored in.
    pub file_path: PathBuf,
    /// 1-based line; absent for file-level findings (e.g., manifest flags).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Small window of surrounding source lines for context display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Remediation guidance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Set by the enrichment pass when the code sits in a dev/test path.
    /// Such findings are dropped from the final result.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_debug_context: bool,
    /// Coarse origin tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FindingCategory>,
}

impl Finding {
    /// A finding anchored to a specific line of code.
    pub fn at_line(
        rule_id: &str,
        severity: Severity,
        description: String,
        file_path: PathBuf,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description,
            severity,
            file_path,
            line: Some(line),
            column: Some(column),
            snippet: None,
            suggestion: None,
            is_debug_context: false,
            category: None,
        }
    }

    /// A file-level finding with no line anchor (manifest/plist flags).
    pub fn file_level(
        rule_id: &str,
        severity: Severity,
        description: String,
        file_path: PathBuf,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description,
            severity,
            file_path,
            line: None,
            column: None,
            snippet: None,
            suggestion: None,
            is_debug_context: false,
            category: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.snippet = Some(snippet);
        self
    }

    pub fn with_category(mut self, category: FindingCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Natural comparison key when diffing two scans. The engine does not
    /// dedupe within one run; a rule may emit several findings per file.
    pub fn dedup_key(&self) -> (&str, &std::path::Path, Option<usize>) {
        (&self.rule_id, &self.file_path, self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Where a finding originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    SourceCode,
    Dependency,
}

/// Aggregate result of one scan invocation. Owned by the engine during the
/// scan, handed to reporters as an immutable snapshot afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Findings in enumeration order, then rule-registration order per file.
    pub findings: Vec<Finding>,
    pub files_scanned: usize,
    /// Files dropped due to read errors. The only signal of a degraded run.
    pub files_skipped: usize,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// Rule ids the caller chose to suppress for this run.
    pub ignored_rules: Vec<String>,
}

impl ScanResult {
    /// Exit-signal contract: at least one non-suppressed finding at or
    /// above the threshold means the caller should fail.
    pub fn has_findings_at_or_above(&self, threshold: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= threshold)
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Findings present here but absent from a baseline scan, compared by
    /// the `(rule_id, file_path, line)` key.
    pub fn added_since<'a>(&'a self, baseline: &ScanResult) -> Vec<&'a Finding> {
        self.findings
            .iter()
            .filter(|f| {
                !baseline
                    .findings
                    .iter()
                    .any(|b| b.dedup_key() == f.dedup_key())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result_with(findings: Vec<Finding>) -> ScanResult {
        ScanResult {
            findings,
            files_scanned: 1,
            files_skipped: 0,
            duration_ms: 0,
            timestamp: Utc::now(),
            ignored_rules: vec![],
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn blocking_signal_requires_threshold() {
        let r = result_with(vec![Finding::file_level(
            "ANDROID_ALLOW_BACKUP",
            Severity::Medium,
            "backup enabled".into(),
            "AndroidManifest.xml".into(),
        )]);
        assert!(!r.has_findings_at_or_above(Severity::High));
        assert!(r.has_findings_at_or_above(Severity::Medium));
    }

    #[test]
    fn diff_uses_rule_file_line_key() {
        let old = result_with(vec![Finding::at_line(
            "INSECURE_HTTP_URL",
            Severity::Medium,
            "http url".into(),
            "src/api.ts".into(),
            10,
            1,
        )]);
        let new = result_with(vec![
            Finding::at_line(
                "INSECURE_HTTP_URL",
                Severity::Medium,
                "http url".into(),
                "src/api.ts".into(),
                10,
                1,
            ),
            Finding::at_line(
                "INSECURE_HTTP_URL",
                Severity::Medium,
                "http url".into(),
                "src/api.ts".into(),
                42,
                1,
            ),
        ]);
        let added = new.added_since(&old);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].line, Some(42));
    }

    #[test]
    fn serializes_without_optional_noise() {
        let f = Finding::file_level(
            "ANDROID_CLEARTEXT_ENABLED",
            Severity::High,
            "cleartext".into(),
            "AndroidManifest.xml".into(),
        );
        let json = serde_json::to_value(&f).unwrap();
        assert!(json.get("line").is_none());
        assert!(json.get("snippet").is_none());
        assert!(json.get("is_debug_context").is_none());
    }
}
