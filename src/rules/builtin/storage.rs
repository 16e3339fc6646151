use crate::context::RuleContext;
use crate::error::Result;
use crate::heuristics;
use crate::patterns;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

use super::CODE_EXTENSIONS;

/// INSECURE_STORAGE_SENSITIVE: credential-like data written to plaintext
/// key-value stores (AsyncStorage, localStorage, sessionStorage).
pub struct InsecureStorageSensitive;

impl Rule for InsecureStorageSensitive {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "INSECURE_STORAGE_SENSITIVE",
            description: "Sensitive value written to unencrypted storage",
            severity: Severity::High,
            extensions: CODE_EXTENSIONS,
            group: "storage",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(Vec::new());
        };
        let mut findings = Vec::new();
        for call in &syntax.calls {
            let plaintext_store = call
                .receiver
                .as_deref()
                .map(|r| patterns::PLAINTEXT_STORAGE_RECEIVERS.contains(&r))
                .unwrap_or(false);
            if !plaintext_store || call.method != "setItem" {
                continue;
            }
            if patterns::SENSITIVE_NAME.is_match(&call.args_text)
                && !patterns::NON_SECRET_NAME.is_match(&call.args_text)
            {
                let receiver = call.receiver.as_deref().unwrap_or_default();
                findings.push(
                    Finding::at_line(
                        "INSECURE_STORAGE_SENSITIVE",
                        Severity::High,
                        format!("Credential-like value stored in {receiver}"),
                        ctx.path.clone(),
                        call.line,
                        call.column,
                    )
                    .with_snippet(heuristics::snippet_around(&ctx.content, call.line, 0))
                    .with_suggestion(
                        "Store tokens in the platform keychain/keystore (e.g. \
                         react-native-keychain or expo-secure-store).",
                    ),
                );
            }
        }
        Ok(findings)
    }
}

/// SENSITIVE_DATA_IN_COOKIE: a `document.cookie` assignment mentioning
/// credential vocabulary. Text rule, per line.
pub struct SensitiveDataInCookie;

impl Rule for SensitiveDataInCookie {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SENSITIVE_DATA_IN_COOKIE",
            description: "Sensitive value written into document.cookie",
            severity: Severity::Medium,
            extensions: CODE_EXTENSIONS,
            group: "storage",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for (idx, line) in ctx.content.lines().enumerate() {
            let Some(pos) = line.find("document.cookie") else {
                continue;
            };
            let after = &line[pos + "document.cookie".len()..];
            if !after.trim_start().starts_with('=') || after.trim_start().starts_with("==") {
                continue;
            }
            if patterns::SENSITIVE_NAME.is_match(line) && !patterns::NON_SECRET_NAME.is_match(line)
            {
                let line_no = idx + 1;
                findings.push(
                    Finding::at_line(
                        "SENSITIVE_DATA_IN_COOKIE",
                        Severity::Medium,
                        "Credential-like value written into document.cookie".into(),
                        ctx.path.clone(),
                        line_no,
                        pos + 1,
                    )
                    .with_snippet(heuristics::snippet_around(&ctx.content, line_no, 0))
                    .with_suggestion(
                        "Let the server set HttpOnly, Secure cookies instead of \
                         writing them from script.",
                    ),
                );
            }
        }
        Ok(findings)
    }
}
