//! Report rendering for scan results.

pub mod console;
pub mod json;

use crate::error::Result;
use crate::rules::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

pub fn render(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(result)),
        OutputFormat::Json => json::render(result),
    }
}
