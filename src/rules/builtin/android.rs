use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::{FileKind, RuleContext};
use crate::error::Result;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

/// Manifest rules are file-level: an AndroidManifest attribute describes the
/// whole application, so findings carry no line anchor.
const MANIFEST_EXTENSIONS: &[&str] = &["xml"];

static CLEARTEXT_ENABLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"android:usesCleartextTraffic\s*=\s*"true""#).unwrap());
static DEBUGGABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"android:debuggable\s*=\s*"true""#).unwrap());
static ALLOW_BACKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"android:allowBackup\s*=\s*"true""#).unwrap());
static EXPORTED_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(activity|service|receiver|provider)\b[^>]*android:exported\s*=\s*"true"[^>]*"#)
        .unwrap()
});

/// ANDROID_CLEARTEXT_ENABLED: the manifest opts the app into plain-HTTP
/// traffic globally.
pub struct CleartextTrafficEnabled;

impl Rule for CleartextTrafficEnabled {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "ANDROID_CLEARTEXT_ENABLED",
            description: "AndroidManifest allows cleartext network traffic",
            severity: Severity::High,
            extensions: MANIFEST_EXTENSIONS,
            group: "android",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::AndroidManifest || !CLEARTEXT_ENABLED.is_match(&ctx.content) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::file_level(
            "ANDROID_CLEARTEXT_ENABLED",
            Severity::High,
            "usesCleartextTraffic=\"true\" permits unencrypted HTTP app-wide".into(),
            ctx.path.clone(),
        )
        .with_suggestion(
            "Remove usesCleartextTraffic, or scope exceptions through a \
             networkSecurityConfig.",
        )])
    }
}

/// ANDROID_DEBUGGABLE: the application element is marked debuggable.
pub struct Debuggable;

impl Rule for Debuggable {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "ANDROID_DEBUGGABLE",
            description: "AndroidManifest marks the application debuggable",
            severity: Severity::High,
            extensions: MANIFEST_EXTENSIONS,
            group: "android",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::AndroidManifest || !DEBUGGABLE.is_match(&ctx.content) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::file_level(
            "ANDROID_DEBUGGABLE",
            Severity::High,
            "android:debuggable=\"true\" exposes the app to runtime inspection".into(),
            ctx.path.clone(),
        )
        .with_suggestion("Never ship release builds with android:debuggable set.")])
    }
}

/// ANDROID_ALLOW_BACKUP: app data is included in device backups.
pub struct AllowBackup;

impl Rule for AllowBackup {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "ANDROID_ALLOW_BACKUP",
            description: "AndroidManifest allows app data in device backups",
            severity: Severity::Medium,
            extensions: MANIFEST_EXTENSIONS,
            group: "android",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::AndroidManifest || !ALLOW_BACKUP.is_match(&ctx.content) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::file_level(
            "ANDROID_ALLOW_BACKUP",
            Severity::Medium,
            "android:allowBackup=\"true\" includes app data in device backups".into(),
            ctx.path.clone(),
        )
        .with_suggestion("Set android:allowBackup=\"false\" or define backup rules.")])
    }
}

/// ANDROID_EXPORTED_COMPONENT: an exported component with no permission
/// guard is callable by any app on the device.
pub struct ExportedComponent;

impl Rule for ExportedComponent {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "ANDROID_EXPORTED_COMPONENT",
            description: "Exported component without a permission requirement",
            severity: Severity::Medium,
            extensions: MANIFEST_EXTENSIONS,
            group: "android",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::AndroidManifest {
            return Ok(Vec::new());
        }
        let mut findings = Vec::new();
        for m in EXPORTED_COMPONENT.find_iter(&ctx.content) {
            if m.as_str().contains("android:permission") {
                continue;
            }
            let kind = EXPORTED_COMPONENT
                .captures(m.as_str())
                .and_then(|c| c.get(1))
                .map(|g| g.as_str().to_owned())
                .unwrap_or_else(|| "component".into());
            findings.push(
                Finding::file_level(
                    "ANDROID_EXPORTED_COMPONENT",
                    Severity::Medium,
                    format!("Exported {kind} without an android:permission guard"),
                    ctx.path.clone(),
                )
                .with_suggestion(
                    "Set android:exported=\"false\" or require a permission on the \
                     component.",
                ),
            );
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const MANIFEST_PATH: &str = "android/app/src/main/AndroidManifest.xml";

    fn manifest(body: &str) -> RuleContext {
        let content = format!(
            "<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\">\n{body}\n</manifest>"
        );
        RuleContext::from_content(Path::new(MANIFEST_PATH), content)
    }

    #[test]
    fn cleartext_enabled_is_file_level_high() {
        let c = manifest(r#"<application android:usesCleartextTraffic="true" />"#);
        let findings = CleartextTrafficEnabled.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].line, None);
    }

    #[test]
    fn cleartext_false_not_flagged() {
        let c = manifest(r#"<application android:usesCleartextTraffic="false" />"#);
        assert!(CleartextTrafficEnabled.check(&c).unwrap().is_empty());
    }

    #[test]
    fn non_manifest_xml_ignored() {
        let c = RuleContext::from_content(
            Path::new("android/app/src/main/res/values/strings.xml"),
            r#"<application android:usesCleartextTraffic="true" />"#.into(),
        );
        assert!(CleartextTrafficEnabled.check(&c).unwrap().is_empty());
    }

    #[test]
    fn debuggable_flagged() {
        let c = manifest(r#"<application android:debuggable="true" />"#);
        assert_eq!(Debuggable.check(&c).unwrap().len(), 1);
    }

    #[test]
    fn allow_backup_flagged_medium() {
        let c = manifest(r#"<application android:allowBackup="true" />"#);
        let findings = AllowBackup.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn exported_activity_without_permission_flagged() {
        let c = manifest(r#"<activity android:name=".DeepLink" android:exported="true">"#);
        assert_eq!(ExportedComponent.check(&c).unwrap().len(), 1);
    }

    #[test]
    fn exported_activity_with_permission_not_flagged() {
        let c = manifest(
            r#"<activity android:name=".DeepLink" android:exported="true" android:permission="com.app.OPEN">"#,
        );
        assert!(ExportedComponent.check(&c).unwrap().is_empty());
    }

    #[test]
    fn unexported_activity_not_flagged() {
        let c = manifest(r#"<activity android:name=".Main" android:exported="false">"#);
        assert!(ExportedComponent.check(&c).unwrap().is_empty());
    }
}
