//! Machine-readable report: the [`ScanResult`] serialized as pretty JSON.

use crate::error::Result;
use crate::rules::ScanResult;

pub fn render(result: &ScanResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Finding, Severity};
    use chrono::Utc;

    #[test]
    fn round_trips_through_serde() {
        let result = ScanResult {
            findings: vec![Finding::at_line(
                "EVAL_USAGE",
                Severity::High,
                "eval".into(),
                "src/a.ts".into(),
                7,
                5,
            )],
            files_scanned: 1,
            files_skipped: 0,
            duration_ms: 4,
            timestamp: Utc::now(),
            ignored_rules: vec!["CONSOLE_LOG_SENSITIVE".into()],
        };
        let text = render(&result).unwrap();
        let parsed: ScanResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.findings.len(), 1);
        assert_eq!(parsed.findings[0].rule_id, "EVAL_USAGE");
        assert_eq!(parsed.findings[0].line, Some(7));
    }
}
