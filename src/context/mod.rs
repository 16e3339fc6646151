//! Per-file source classification and rule-context construction.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::parser::{self, SyntaxIndex};

/// Structural category of a file, decided from its path/extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// JS/TS source; gets a best-effort syntax index.
    Code,
    /// JSON configuration; gets a parsed value, or nothing if malformed.
    Json,
    /// Android manifest XML, raw text only.
    AndroidManifest,
    /// iOS property list, raw text only.
    Plist,
    /// Everything else; no rules apply.
    Inert,
}

impl FileKind {
    pub fn classify(path: &Path) -> Self {
        if path
            .file_name()
            .is_some_and(|n| n == "AndroidManifest.xml")
        {
            return Self::AndroidManifest;
        }
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("js" | "jsx" | "ts" | "tsx") => Self::Code,
            Some("json") => Self::Json,
            Some("plist") => Self::Plist,
            _ => Self::Inert,
        }
    }
}

/// Per-file working set handed to every rule. Built fresh per file, never
/// reused across files.
#[derive(Debug)]
pub struct RuleContext {
    pub path: PathBuf,
    pub content: String,
    pub kind: FileKind,
    /// Present for code files that parsed (even partially); absent when the
    /// parser gave up entirely. Text rules run either way.
    pub syntax: Option<SyntaxIndex>,
    /// Present for JSON files that parsed; malformed JSON is treated as
    /// absent configuration.
    pub json: Option<serde_json::Value>,
}

impl RuleContext {
    /// Read the file and build the representations its category needs.
    /// Read errors propagate to the engine, which counts a skip.
    pub fn build(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_content(path, content))
    }

    /// Build a context from in-memory content (tests, pre-read callers).
    pub fn from_content(path: &Path, content: String) -> Self {
        let kind = FileKind::classify(path);

        let syntax = if kind == FileKind::Code {
            match parser::parse_source(path, &content) {
                Ok(index) => Some(index),
                Err(e) => {
                    tracing::debug!(file = %path.display(), error = %e, "parse degraded to raw text");
                    None
                }
            }
        } else {
            None
        };

        let json = if kind == FileKind::Json {
            serde_json::from_str(&content).ok()
        } else {
            None
        };

        Self {
            path: path.to_path_buf(),
            content,
            kind,
            syntax,
            json,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_from_extension() {
        assert_eq!(FileKind::classify(Path::new("src/App.tsx")), FileKind::Code);
        assert_eq!(FileKind::classify(Path::new("src/api.js")), FileKind::Code);
        assert_eq!(
            FileKind::classify(Path::new("package.json")),
            FileKind::Json
        );
        assert_eq!(
            FileKind::classify(Path::new("android/app/src/main/AndroidManifest.xml")),
            FileKind::AndroidManifest
        );
        assert_eq!(
            FileKind::classify(Path::new("ios/App/Info.plist")),
            FileKind::Plist
        );
        assert_eq!(
            FileKind::classify(Path::new("res/values/strings.xml")),
            FileKind::Inert
        );
        assert_eq!(FileKind::classify(Path::new("README.md")), FileKind::Inert);
    }

    #[test]
    fn code_context_gets_syntax_index() {
        let ctx = RuleContext::from_content(
            Path::new("app.ts"),
            "const x = fetch('https://example.com');".into(),
        );
        assert!(ctx.syntax.is_some());
        assert!(ctx.json.is_none());
    }

    #[test]
    fn malformed_json_treated_as_absent() {
        let ctx =
            RuleContext::from_content(Path::new("broken.json"), "{ not json at all".into());
        assert_eq!(ctx.kind, FileKind::Json);
        assert!(ctx.json.is_none());
    }

    #[test]
    fn valid_json_parsed() {
        let ctx = RuleContext::from_content(
            Path::new("package.json"),
            r#"{"dependencies":{"lodash":"4.17.0"}}"#.into(),
        );
        assert!(ctx.json.is_some());
    }
}
