use crate::context::RuleContext;
use crate::error::Result;
use crate::heuristics;
use crate::patterns;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

use super::CODE_EXTENSIONS;

/// EVAL_USAGE: dynamic code execution through `eval` or the `Function`
/// constructor.
pub struct EvalUsage;

impl Rule for EvalUsage {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "EVAL_USAGE",
            description: "Dynamic code execution via eval or Function constructor",
            severity: Severity::High,
            extensions: CODE_EXTENSIONS,
            group: "code",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(Vec::new());
        };
        let mut findings = Vec::new();
        for call in &syntax.calls {
            if call.callee == "eval" || call.callee == "Function" {
                findings.push(
                    Finding::at_line(
                        "EVAL_USAGE",
                        Severity::High,
                        format!("Dynamic code execution via {}()", call.callee),
                        ctx.path.clone(),
                        call.line,
                        call.column,
                    )
                    .with_snippet(heuristics::snippet_around(&ctx.content, call.line, 1))
                    .with_suggestion("Avoid evaluating strings as code."),
                );
            }
        }
        Ok(findings)
    }
}

/// DANGEROUS_INNER_HTML: `dangerouslySetInnerHTML` on a JSX element. A
/// dynamic expression is rated High, a static payload Medium.
pub struct DangerousInnerHtml;

impl Rule for DangerousInnerHtml {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "DANGEROUS_INNER_HTML",
            description: "Raw HTML injection via dangerouslySetInnerHTML",
            severity: Severity::High,
            extensions: CODE_EXTENSIONS,
            group: "code",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(Vec::new());
        };
        let mut findings = Vec::new();
        for element in &syntax.jsx_elements {
            let Some(attr) = element.attribute("dangerouslySetInnerHTML") else {
                continue;
            };
            let severity = if attr.value.is_dynamic() {
                Severity::High
            } else {
                Severity::Medium
            };
            findings.push(
                Finding::at_line(
                    "DANGEROUS_INNER_HTML",
                    severity,
                    format!("dangerouslySetInnerHTML on <{}>", element.name),
                    ctx.path.clone(),
                    element.line,
                    element.column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, element.line, 1))
                .with_suggestion("Sanitize HTML before rendering, or render text nodes."),
            );
        }
        Ok(findings)
    }
}

/// WEBVIEW_JAVASCRIPT_ENABLED: a WebView with JavaScript switched on that
/// loads a source computed at runtime.
pub struct WebViewJavascriptEnabled;

impl Rule for WebViewJavascriptEnabled {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "WEBVIEW_JAVASCRIPT_ENABLED",
            description: "WebView with JavaScript enabled loading a dynamic source",
            severity: Severity::Medium,
            extensions: CODE_EXTENSIONS,
            group: "code",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(Vec::new());
        };
        let mut findings = Vec::new();
        for element in &syntax.jsx_elements {
            if !element.name.contains("WebView") {
                continue;
            }
            let js_on = element
                .attribute("javaScriptEnabled")
                .map(|a| a.value.is_true())
                .unwrap_or(false);
            let dynamic_source = element
                .attribute("source")
                .map(|a| a.value.is_dynamic())
                .unwrap_or(false);
            if js_on && dynamic_source {
                findings.push(
                    Finding::at_line(
                        "WEBVIEW_JAVASCRIPT_ENABLED",
                        Severity::Medium,
                        format!("<{}> enables JavaScript for a dynamic source", element.name),
                        ctx.path.clone(),
                        element.line,
                        element.column,
                    )
                    .with_snippet(heuristics::snippet_around(&ctx.content, element.line, 1))
                    .with_suggestion(
                        "Restrict WebView sources to an allowlist when JavaScript is on.",
                    ),
                );
            }
        }
        Ok(findings)
    }
}

/// SQL_STRING_CONCAT: a SQL statement assembled by string interpolation or
/// concatenation. Line-oriented text rule.
pub struct SqlStringConcat;

fn line_concatenates(line: &str) -> bool {
    if line.contains("${") {
        return true;
    }
    // '...' + x  or  "..." + x
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'+' {
            let before = line[..i].trim_end();
            if before.ends_with('\'') || before.ends_with('"') || before.ends_with('`') {
                return true;
            }
        }
    }
    false
}

impl Rule for SqlStringConcat {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SQL_STRING_CONCAT",
            description: "SQL statement built by string concatenation or interpolation",
            severity: Severity::Medium,
            extensions: CODE_EXTENSIONS,
            group: "code",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for (idx, line) in ctx.content.lines().enumerate() {
            if patterns::SQL_VERB.is_match(line) && line_concatenates(line) {
                let line_no = idx + 1;
                findings.push(
                    Finding::at_line(
                        "SQL_STRING_CONCAT",
                        Severity::Medium,
                        "SQL statement built from interpolated or concatenated input".into(),
                        ctx.path.clone(),
                        line_no,
                        1,
                    )
                    .with_snippet(heuristics::snippet_around(&ctx.content, line_no, 0))
                    .with_suggestion("Use parameterized queries (placeholders) instead."),
                );
            }
        }
        Ok(findings)
    }
}

/// CONSOLE_LOG_SENSITIVE: a console call whose arguments mention
/// credential-like names.
pub struct ConsoleLogSensitive;

impl Rule for ConsoleLogSensitive {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "CONSOLE_LOG_SENSITIVE",
            description: "Sensitive value passed to console logging",
            severity: Severity::Low,
            extensions: CODE_EXTENSIONS,
            group: "code",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(Vec::new());
        };
        let mut findings = Vec::new();
        for call in &syntax.calls {
            let is_console = call.receiver.as_deref() == Some("console")
                && matches!(call.method.as_str(), "log" | "warn" | "info" | "debug");
            if !is_console {
                continue;
            }
            if patterns::SENSITIVE_NAME.is_match(&call.args_text)
                && !patterns::NON_SECRET_NAME.is_match(&call.args_text)
            {
                findings.push(
                    Finding::at_line(
                        "CONSOLE_LOG_SENSITIVE",
                        Severity::Low,
                        "Credential-like value passed to console logging".into(),
                        ctx.path.clone(),
                        call.line,
                        call.column,
                    )
                    .with_snippet(heuristics::snippet_around(&ctx.content, call.line, 0))
                    .with_suggestion("Strip secrets from log output."),
                );
            }
        }
        Ok(findings)
    }
}
