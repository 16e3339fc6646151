pub mod builtin;
pub mod finding;

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::context::RuleContext;
use crate::error::Result;

pub use finding::{Finding, FindingCategory, ScanResult, Severity};

/// A detection rule: fixed identity and severity, a declared set of
/// eligible file extensions, and a pure detection function over the
/// per-file context. Rules never share state and never observe each other.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;

    /// Inspect one file. An `Err` is isolated by the engine: it is logged
    /// and the rule simply contributes no findings for that file.
    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>>;
}

/// Static description of a rule, used for selection and `list-rules`.
#[derive(Debug, Clone, Serialize)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    /// File extensions (lowercase, no dot) the rule applies to.
    pub extensions: &'static [&'static str],
    /// Documentation grouping only, no behavioral meaning.
    pub group: &'static str,
}

/// The fixed rule set, constructed once at startup, never mutated.
pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
}

impl Registry {
    pub fn with_builtin_rules() -> Self {
        Self {
            rules: builtin::all_rules(),
        }
    }

    #[cfg(test)]
    pub fn from_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Every registered rule whose extensions match the file's extension,
    /// minus ignored ids. Pure filter, registration order preserved.
    pub fn applicable_rules(&self, path: &Path, ignore: &HashSet<String>) -> Vec<&dyn Rule> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| {
                let meta = r.metadata();
                meta.extensions.contains(&ext.as_str()) && !ignore.contains(meta.id)
            })
            .collect()
    }

    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|r| r.metadata()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_populated() {
        let registry = Registry::with_builtin_rules();
        assert!(registry.len() >= 20);
    }

    #[test]
    fn rule_ids_are_unique() {
        let registry = Registry::with_builtin_rules();
        let mut seen = HashSet::new();
        for meta in registry.list_rules() {
            assert!(seen.insert(meta.id), "duplicate rule id: {}", meta.id);
        }
    }

    #[test]
    fn selection_filters_by_extension() {
        let registry = Registry::with_builtin_rules();
        let ignore = HashSet::new();

        let code_rules = registry.applicable_rules(Path::new("src/api.ts"), &ignore);
        assert!(code_rules
            .iter()
            .any(|r| r.metadata().id == "WEAK_HASH_ALGORITHM"));
        assert!(!code_rules
            .iter()
            .any(|r| r.metadata().id == "ANDROID_CLEARTEXT_ENABLED"));

        let xml_rules = registry.applicable_rules(Path::new("AndroidManifest.xml"), &ignore);
        assert!(xml_rules
            .iter()
            .any(|r| r.metadata().id == "ANDROID_CLEARTEXT_ENABLED"));
        assert!(!xml_rules
            .iter()
            .any(|r| r.metadata().id == "WEAK_HASH_ALGORITHM"));
    }

    #[test]
    fn ignore_set_shrinks_selection() {
        let registry = Registry::with_builtin_rules();
        let mut ignore = HashSet::new();
        ignore.insert("INSECURE_HTTP_URL".to_string());

        let rules = registry.applicable_rules(Path::new("src/api.ts"), &ignore);
        assert!(!rules.iter().any(|r| r.metadata().id == "INSECURE_HTTP_URL"));
    }
}
