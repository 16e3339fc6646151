use url::Url;

use crate::context::RuleContext;
use crate::error::Result;
use crate::heuristics;
use crate::patterns;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

use super::{line_col_of_offset, CODE_AND_CONFIG_EXTENSIONS};

/// INSECURE_HTTP_URL: a plain-HTTP URL literal. Loopback/emulator hosts and
/// XML-namespace URLs are tolerated. Text rule; works without a parse.
pub struct InsecureHttpUrl;

fn is_allowed_http_host(url_text: &str) -> bool {
    let Ok(url) = Url::parse(url_text) else {
        // Unparseable matches (template fragments) are left alone.
        return true;
    };
    let Some(host) = url.host_str() else {
        return true;
    };
    patterns::HTTP_ALLOWED_HOSTS
        .iter()
        .any(|allowed| host == *allowed || host.ends_with(&format!(".{allowed}")))
}

impl Rule for InsecureHttpUrl {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "INSECURE_HTTP_URL",
            description: "Unencrypted http:// URL in source or configuration",
            severity: Severity::Medium,
            extensions: CODE_AND_CONFIG_EXTENSIONS,
            group: "network",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for m in patterns::HTTP_URL.find_iter(&ctx.content) {
            if is_allowed_http_host(m.as_str()) {
                continue;
            }
            let (line, column) = line_col_of_offset(&ctx.content, m.start());
            findings.push(
                Finding::at_line(
                    "INSECURE_HTTP_URL",
                    Severity::Medium,
                    format!("Unencrypted HTTP URL: {}", m.as_str()),
                    ctx.path.clone(),
                    line,
                    column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, line, 1))
                .with_suggestion("Use https:// for all remote endpoints."),
            );
        }
        Ok(findings)
    }
}

/// WEAK_TLS_VERSION: an obsolete SSL/TLS protocol version pinned in code
/// or configuration.
pub struct WeakTlsVersion;

impl Rule for WeakTlsVersion {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "WEAK_TLS_VERSION",
            description: "Obsolete SSL/TLS protocol version configured",
            severity: Severity::High,
            extensions: CODE_AND_CONFIG_EXTENSIONS,
            group: "network",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for m in patterns::WEAK_TLS_VERSION.find_iter(&ctx.content) {
            let (line, column) = line_col_of_offset(&ctx.content, m.start());
            findings.push(
                Finding::at_line(
                    "WEAK_TLS_VERSION",
                    Severity::High,
                    format!("Obsolete TLS/SSL version '{}'", m.as_str().trim()),
                    ctx.path.clone(),
                    line,
                    column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, line, 1))
                .with_suggestion("Require TLS 1.2 or newer."),
            );
        }
        Ok(findings)
    }
}

/// SSL_VERIFICATION_DISABLED: certificate validation switched off.
pub struct SslVerificationDisabled;

impl Rule for SslVerificationDisabled {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SSL_VERIFICATION_DISABLED",
            description: "TLS certificate verification disabled",
            severity: Severity::High,
            extensions: CODE_AND_CONFIG_EXTENSIONS,
            group: "network",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        use once_cell::sync::Lazy;
        use regex::Regex;
        static DISABLED_VERIFY: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r#"rejectUnauthorized\s*:\s*false|strictSSL\s*:\s*false|trustAllCerts|allowsInvalidSSLCertificates|NODE_TLS_REJECT_UNAUTHORIZED.{0,10}['"]?0['"]?"#,
            )
            .unwrap()
        });

        let mut findings = Vec::new();
        for m in DISABLED_VERIFY.find_iter(&ctx.content) {
            let (line, column) = line_col_of_offset(&ctx.content, m.start());
            findings.push(
                Finding::at_line(
                    "SSL_VERIFICATION_DISABLED",
                    Severity::High,
                    "TLS certificate verification is disabled".into(),
                    ctx.path.clone(),
                    line,
                    column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, line, 1))
                .with_suggestion(
                    "Never disable certificate checks in shipped builds; pin or trust \
                     the proper CA instead.",
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

    fn ctx(code: &str) -> RuleContext {
        RuleContext::from_content(Path::new("src/api.ts"), code.into())
    }

    #[test]
    fn http_url_flagged_once() {
        let c = ctx("fetch('http://api.example.com/users');");
        let findings = InsecureHttpUrl.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn https_url_not_flagged() {
        let c = ctx("fetch('https://api.example.com/users');");
        assert!(InsecureHttpUrl.check(&c).unwrap().is_empty());
    }

    #[test]
    fn loopback_and_emulator_hosts_tolerated() {
        let c = ctx("const dev = 'http://localhost:8081';\nconst emu = 'http://10.0.2.2:3000';");
        assert!(InsecureHttpUrl.check(&c).unwrap().is_empty());
    }

    #[test]
    fn xml_namespace_url_tolerated() {
        let c = ctx("const ns = 'http://schemas.android.com/apk/res/android';");
        assert!(InsecureHttpUrl.check(&c).unwrap().is_empty());
    }

    #[test]
    fn multiple_urls_yield_multiple_findings() {
        let c = ctx("fetch('http://a.example.com');\nfetch('http://b.example.com');");
        assert_eq!(InsecureHttpUrl.check(&c).unwrap().len(), 2);
    }

    #[test]
    fn weak_tls_flagged() {
        let c = ctx("tls.connect({ minVersion: 'TLSv1.1' });");
        let findings = WeakTlsVersion.check(&c).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("TLSv1.1"));
    }

    #[test]
    fn modern_tls_not_flagged() {
        let c = ctx("tls.connect({ minVersion: 'TLSv1.3' });");
        assert!(WeakTlsVersion.check(&c).unwrap().is_empty());
    }

    #[test]
    fn reject_unauthorized_false_flagged() {
        let c = ctx("new https.Agent({ rejectUnauthorized: false });");
        assert_eq!(SslVerificationDisabled.check(&c).unwrap().len(), 1);
    }

    #[test]
    fn reject_unauthorized_true_not_flagged() {
        let c = ctx("new https.Agent({ rejectUnauthorized: true });");
        assert!(SslVerificationDisabled.check(&c).unwrap().is_empty());
    }
}
