//! Human-readable report, highest severity first.

use std::fmt::Write;

use crate::rules::{Finding, ScanResult, Severity};

fn location(finding: &Finding) -> String {
    match finding.line {
        Some(line) => format!("{}:{line}", finding.file_path.display()),
        None => finding.file_path.display().to_string(),
    }
}

fn write_section(out: &mut String, result: &ScanResult, severity: Severity, label: &str) {
    let findings: Vec<&Finding> = result
        .findings
        .iter()
        .filter(|f| f.severity == severity)
        .collect();
    if findings.is_empty() {
        return;
    }
    let _ = writeln!(out, "{label} ({})", findings.len());
    for finding in findings {
        let _ = writeln!(out, "  {} {}", finding.rule_id, location(finding));
        let _ = writeln!(out, "      {}", finding.description);
        if let Some(snippet) = &finding.snippet {
            for line in snippet.lines() {
                let _ = writeln!(out, "      | {line}");
            }
        }
        if let Some(suggestion) = &finding.suggestion {
            let _ = writeln!(out, "      fix: {suggestion}");
        }
    }
    let _ = writeln!(out);
}

pub fn render(result: &ScanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "mobscan report");
    let _ = writeln!(out, "==============");
    let _ = writeln!(out);

    if result.findings.is_empty() {
        let _ = writeln!(out, "No findings.");
    } else {
        write_section(&mut out, result, Severity::High, "HIGH");
        write_section(&mut out, result, Severity::Medium, "MEDIUM");
        write_section(&mut out, result, Severity::Low, "LOW");
    }

    let _ = writeln!(
        out,
        "{} finding(s): {} high, {} medium, {} low",
        result.findings.len(),
        result.count_by_severity(Severity::High),
        result.count_by_severity(Severity::Medium),
        result.count_by_severity(Severity::Low),
    );
    let _ = writeln!(
        out,
        "{} file(s) scanned, {} skipped, {} ms",
        result.files_scanned, result.files_skipped, result.duration_ms
    );
    if !result.ignored_rules.is_empty() {
        let _ = writeln!(out, "ignored rules: {}", result.ignored_rules.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result_with(findings: Vec<Finding>) -> ScanResult {
        ScanResult {
            findings,
            files_scanned: 3,
            files_skipped: 1,
            duration_ms: 12,
            timestamp: Utc::now(),
            ignored_rules: vec![],
        }
    }

    #[test]
    fn clean_scan_prints_no_findings() {
        let text = render(&result_with(vec![]));
        assert!(text.contains("No findings."));
        assert!(text.contains("3 file(s) scanned, 1 skipped"));
    }

    #[test]
    fn high_section_precedes_medium() {
        let findings = vec![
            Finding::at_line(
                "INSECURE_HTTP_URL",
                Severity::Medium,
                "http url".into(),
                "src/api.ts".into(),
                3,
                1,
            ),
            Finding::file_level(
                "ANDROID_CLEARTEXT_ENABLED",
                Severity::High,
                "cleartext".into(),
                "AndroidManifest.xml".into(),
            ),
        ];
        let text = render(&result_with(findings));
        let high = text.find("HIGH (1)").unwrap();
        let medium = text.find("MEDIUM (1)").unwrap();
        assert!(high < medium);
        assert!(text.contains("src/api.ts:3"));
    }
}
