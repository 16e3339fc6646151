//! Scan configuration, loaded from a `.mobscan.toml` at the target root
//! (or an explicit path). A missing file means default policy.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::rules::Severity;

pub const CONFIG_FILE_NAME: &str = ".mobscan.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Findings at or above this severity fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Rule ids excluded from the run entirely.
    #[serde(default)]
    pub ignore_rules: HashSet<String>,
    /// Glob patterns for paths to skip, on top of the built-in excludes.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

fn default_fail_on() -> Severity {
    Severity::High
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: default_fail_on(),
            ignore_rules: HashSet::new(),
            exclude_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration for a scan of `root`. An explicit `path` must
    /// exist; otherwise `.mobscan.toml` under the root is used when present
    /// and defaults apply when it is not.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ScanError::Config(format!(
                        "config file not found: {}",
                        explicit.display()
                    )));
                }
                explicit.to_path_buf()
            }
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    return Ok(Config::default());
                }
                candidate
            }
        };
        let text = std::fs::read_to_string(&file)?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }
}

/// Starter config written by `mobscan init`.
pub fn starter_toml() -> &'static str {
    r#"# mobscan configuration

[policy]
# Severity that fails the scan: "low", "medium" or "high".
fail_on = "high"

# Rule ids to skip entirely.
ignore_rules = []

# Extra glob patterns to exclude, on top of node_modules/, build/, Pods/ etc.
exclude_paths = []
"#
}
