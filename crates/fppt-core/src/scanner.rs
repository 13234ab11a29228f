//! `include` line scanning.
//!
//! Only lines of the form `include "<target>"` or `include '<target>'`, with
//! optional leading indentation, are recognised. Anything else is ignored.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::search_path::TEMPLATE_SUFFIX;

static INCLUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[ \t]*include +['"]([^'"]+)['"]"#).expect("include pattern is valid")
});

/// Include targets declared by one file, split by kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Targets ending in `.fppt`, in line order.
    pub invocations: Vec<PathBuf>,
    /// All other targets, in line order.
    pub includes: Vec<PathBuf>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty() && self.includes.is_empty()
    }
}

/// Scan `path` for include targets, resolved against the file's directory.
pub fn scan(path: &Path) -> Result<ScanResult> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let result = scan_str(&source, base_dir);
    tracing::debug!(
        file = %path.display(),
        invocations = result.invocations.len(),
        includes = result.includes.len(),
        "Scanned file"
    );
    Ok(result)
}

/// Extract include targets from in-memory text.
pub fn scan_str(source: &str, base_dir: &Path) -> ScanResult {
    let invocation_suffix = format!(".{TEMPLATE_SUFFIX}");
    let mut result = ScanResult::default();

    for line in source.lines() {
        let Some(captures) = INCLUDE_PATTERN.captures(line) else {
            continue;
        };
        let target = &captures[1];
        let resolved = base_dir.join(target);
        if target.ends_with(&invocation_suffix) {
            result.invocations.push(resolved);
        } else {
            result.includes.push(resolved);
        }
    }

    result
}
