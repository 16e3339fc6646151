use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::{FileKind, RuleContext};
use crate::error::Result;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

const PLIST_EXTENSIONS: &[&str] = &["plist"];

/// Property-list XML puts the value element after the key element, with
/// whitespace in between. `<true/>` may be written `<true />`.
static ATS_DISABLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<key>NSAllowsArbitraryLoads</key>\s*<true\s*/>").unwrap());
static HTTP_EXCEPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<key>NSExceptionAllowsInsecureHTTPLoads</key>\s*<true\s*/>").unwrap());
static FILE_SHARING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<key>UIFileSharingEnabled</key>\s*<true\s*/>").unwrap());

/// IOS_ATS_DISABLED: App Transport Security switched off wholesale.
pub struct AtsDisabled;

impl Rule for AtsDisabled {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "IOS_ATS_DISABLED",
            description: "Info.plist disables App Transport Security",
            severity: Severity::High,
            extensions: PLIST_EXTENSIONS,
            group: "ios",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::Plist || !ATS_DISABLED.is_match(&ctx.content) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::file_level(
            "IOS_ATS_DISABLED",
            Severity::High,
            "NSAllowsArbitraryLoads=true disables App Transport Security".into(),
            ctx.path.clone(),
        )
        .with_suggestion(
            "Remove NSAllowsArbitraryLoads; declare per-domain exceptions only \
             where unavoidable.",
        )])
    }
}

/// IOS_HTTP_EXCEPTION_DOMAIN: a per-domain exemption from HTTPS.
pub struct HttpExceptionDomain;

impl Rule for HttpExceptionDomain {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "IOS_HTTP_EXCEPTION_DOMAIN",
            description: "Info.plist exempts a domain from HTTPS",
            severity: Severity::Medium,
            extensions: PLIST_EXTENSIONS,
            group: "ios",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::Plist {
            return Ok(Vec::new());
        }
        let findings = HTTP_EXCEPTION
            .find_iter(&ctx.content)
            .map(|_| {
                Finding::file_level(
                    "IOS_HTTP_EXCEPTION_DOMAIN",
                    Severity::Medium,
                    "NSExceptionAllowsInsecureHTTPLoads exempts a domain from HTTPS".into(),
                    ctx.path.clone(),
                )
                .with_suggestion("Serve the excepted domain over HTTPS and drop the exception.")
            })
            .collect();
        Ok(findings)
    }
}

/// IOS_FILE_SHARING_ENABLED: the app's Documents directory is exposed
/// through Finder/iTunes file sharing.
pub struct FileSharingEnabled;

impl Rule for FileSharingEnabled {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "IOS_FILE_SHARING_ENABLED",
            description: "Info.plist exposes the Documents directory via file sharing",
            severity: Severity::Low,
            extensions: PLIST_EXTENSIONS,
            group: "ios",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.kind != FileKind::Plist || !FILE_SHARING.is_match(&ctx.content) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::file_level(
            "IOS_FILE_SHARING_ENABLED",
            Severity::Low,
            "UIFileSharingEnabled=true exposes app documents to desktop file sharing".into(),
            ctx.path.clone(),
        )
        .with_suggestion("Disable file sharing unless users are meant to browse app files.")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn plist(body: &str) -> RuleContext {
        let content = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\">\n<dict>\n{body}\n</dict>\n</plist>"
        );
        RuleContext::from_content(Path::new("ios/App/Info.plist"), content)
    }

    #[test]
    fn ats_disabled_flagged_file_level() {
        let c = plist("<key>NSAllowsArbitraryLoads</key>\n<true/>");
        let findings = AtsDisabled.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].line, None);
    }

    #[test]
    fn ats_false_not_flagged() {
        let c = plist("<key>NSAllowsArbitraryLoads</key>\n<false/>");
        assert!(AtsDisabled.check(&c).unwrap().is_empty());
    }

    #[test]
    fn true_with_space_before_slash_matches() {
        let c = plist("<key>NSAllowsArbitraryLoads</key> <true />");
        assert_eq!(AtsDisabled.check(&c).unwrap().len(), 1);
    }

    #[test]
    fn http_exception_domain_flagged() {
        let c = plist(
            "<key>NSExceptionDomains</key>\n<dict>\n<key>legacy.example.com</key>\n<dict>\n<key>NSExceptionAllowsInsecureHTTPLoads</key>\n<true/>\n</dict>\n</dict>",
        );
        let findings = HttpExceptionDomain.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn file_sharing_flagged_low() {
        let c = plist("<key>UIFileSharingEnabled</key>\n<true/>");
        let findings = FileSharingEnabled.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }
}
