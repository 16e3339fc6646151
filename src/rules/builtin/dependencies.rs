use semver::{Version, VersionReq};

use crate::context::RuleContext;
use crate::error::Result;
use crate::patterns::{self, DependencyAdvisory};
use crate::rules::{Finding, FindingCategory, Rule, RuleMetadata};

/// VULNERABLE_DEPENDENCY: a package.json dependency matching a known
/// advisory. Version ranges like `^4.17.4` are resolved optimistically to
/// their base version; a range that cannot be parsed is treated as affected
/// when the advisory covers all versions.
pub struct VulnerableDependency;

fn declared_version(range: &str) -> Option<Version> {
    let trimmed = range.trim().trim_start_matches(['^', '~', '>', '<', '=', 'v']);
    Version::parse(trimmed.trim()).ok()
}

fn advisory_applies(advisory: &DependencyAdvisory, range: &str) -> bool {
    if advisory.affected == "*" {
        return true;
    }
    let Ok(req) = VersionReq::parse(advisory.affected) else {
        return false;
    };
    match declared_version(range) {
        Some(version) => req.matches(&version),
        // Tags like "latest" or git URLs: cannot prove the pin is safe,
        // but only flat ranges are worth flagging.
        None => false,
    }
}

fn scan_section(
    ctx: &RuleContext,
    section: &serde_json::Map<String, serde_json::Value>,
    findings: &mut Vec<Finding>,
) {
    for (package, range_value) in section {
        let Some(range) = range_value.as_str() else {
            continue;
        };
        for advisory in patterns::DEPENDENCY_ADVISORIES.iter() {
            if advisory.package == package && advisory_applies(advisory, range) {
                findings.push(
                    Finding::file_level(
                        "VULNERABLE_DEPENDENCY",
                        advisory.severity,
                        format!("{package} {range}: {}", advisory.summary),
                        ctx.path.clone(),
                    )
                    .with_category(FindingCategory::Dependency)
                    .with_suggestion("Upgrade to a patched release or replace the package."),
                );
            }
        }
    }
}

impl Rule for VulnerableDependency {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "VULNERABLE_DEPENDENCY",
            description: "package.json dependency with a known advisory",
            severity: crate::rules::Severity::High,
            extensions: &["json"],
            group: "dependencies",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.path.file_name().and_then(|n| n.to_str()) != Some("package.json") {
            return Ok(Vec::new());
        }
        let Some(root) = ctx.json.as_ref().and_then(|v| v.as_object()) else {
            return Ok(Vec::new());
        };
        let mut findings = Vec::new();
        for section_name in ["dependencies", "devDependencies"] {
            if let Some(section) = root.get(section_name).and_then(|v| v.as_object()) {
                scan_section(ctx, section, &mut findings);
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use std::path::Path;

    fn package_json(body: &str) -> RuleContext {
        RuleContext::from_content(Path::new("package.json"), body.into())
    }

    #[test]
    fn outdated_lodash_flagged() {
        let c = package_json(r#"{ "dependencies": { "lodash": "^4.17.4" } }"#);
        let findings = VulnerableDependency.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("lodash"));
        assert_eq!(findings[0].category, Some(FindingCategory::Dependency));
        assert_eq!(findings[0].line, None);
    }

    #[test]
    fn patched_lodash_not_flagged() {
        let c = package_json(r#"{ "dependencies": { "lodash": "^4.17.21" } }"#);
        assert!(VulnerableDependency.check(&c).unwrap().is_empty());
    }

    #[test]
    fn withdrawn_package_flagged_at_any_version() {
        let c = package_json(r#"{ "dependencies": { "event-stream": "3.3.6" } }"#);
        let findings = VulnerableDependency.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn dev_dependencies_also_scanned() {
        let c = package_json(r#"{ "devDependencies": { "minimist": "~1.2.0" } }"#);
        assert_eq!(VulnerableDependency.check(&c).unwrap().len(), 1);
    }

    #[test]
    fn other_json_files_ignored() {
        let c = RuleContext::from_content(
            Path::new("app.json"),
            r#"{ "dependencies": { "lodash": "4.17.4" } }"#.into(),
        );
        assert!(VulnerableDependency.check(&c).unwrap().is_empty());
    }

    #[test]
    fn unparseable_range_not_flagged_for_versioned_advisory() {
        let c = package_json(r#"{ "dependencies": { "lodash": "github:lodash/lodash" } }"#);
        assert!(VulnerableDependency.check(&c).unwrap().is_empty());
    }
}
