//! Template resolution across an ordered set of search locations.
//!
//! For each location, only `<location>/topology-templates` is consulted. The
//! order of locations is kept for reporting, but it carries no priority: a
//! definition must exist in exactly one location.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Fixed subdirectory of every search location holding definitions.
pub const TEMPLATE_FOLDER_NAME: &str = "topology-templates";

/// Reserved suffix of definitions and invocations (without the dot).
pub const TEMPLATE_SUFFIX: &str = "fppt";

/// Fixed directory name for snippets, both beside definitions and beside outputs.
pub const SNIPPET_FOLDER_NAME: &str = "snippets";

/// Where a template invocation's definition lives and how it is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    /// Absolute or location-relative path to the unique definition file.
    pub definition_path: PathBuf,
    /// Definition identity, e.g. `a.fppt` for invocation `a.x.fppt`.
    pub definition_name: String,
    /// The tag between base name and suffix, passed as `template_name`.
    pub template_name: String,
}

/// An ordered list of search locations.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    locations: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(locations: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve the unique definition backing `invocation`.
    pub fn resolve_definition(&self, invocation: &Path) -> Result<TemplateInfo> {
        resolve_definition(invocation, &self.locations)
    }

    /// Every existing template directory, in search order.
    pub fn template_roots(&self) -> Result<Vec<PathBuf>> {
        resolve_template_roots(&self.locations)
    }
}

/// Split an invocation file name `<base>.<tag>.fppt` into the definition
/// name `<base>.fppt` and the tag.
pub fn definition_info(invocation: &Path) -> Result<(String, String)> {
    let invalid = |reason| Error::InvalidInvocation {
        path: invocation.to_path_buf(),
        reason,
    };

    let file_name = invocation
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| invalid("file name is missing or not valid UTF-8"))?;

    let stem = file_name
        .strip_suffix(TEMPLATE_SUFFIX)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(|| invalid("name does not end with the template suffix"))?;

    let (base, tag) = stem
        .rsplit_once('.')
        .ok_or_else(|| invalid("name has no template-name segment"))?;
    if base.is_empty() || tag.is_empty() {
        return Err(invalid("base name and template name must be non-empty"));
    }

    Ok((format!("{base}.{TEMPLATE_SUFFIX}"), tag.to_string()))
}

/// Resolve the unique definition for `invocation` across `locations`.
///
/// Fails with [`Error::NotFound`] when no location provides the definition and
/// with [`Error::Ambiguous`] when more than one does.
pub fn resolve_definition(invocation: &Path, locations: &[PathBuf]) -> Result<TemplateInfo> {
    let (definition_name, template_name) = definition_info(invocation)?;

    let candidates: Vec<PathBuf> = locations
        .iter()
        .map(|location| location.join(TEMPLATE_FOLDER_NAME).join(&definition_name))
        .collect();
    let mut found: Vec<PathBuf> = candidates.iter().filter(|c| c.is_file()).cloned().collect();

    match found.len() {
        0 => Err(Error::NotFound {
            definition: definition_name,
            candidates,
        }),
        1 => {
            let definition_path = found.remove(0);
            tracing::debug!(
                invocation = %invocation.display(),
                definition = %definition_path.display(),
                %template_name,
                "Resolved template definition"
            );
            Ok(TemplateInfo {
                definition_path,
                definition_name,
                template_name,
            })
        }
        _ => Err(Error::Ambiguous {
            definition: definition_name,
            candidates: found,
        }),
    }
}

/// Collect every existing `<location>/topology-templates` directory.
pub fn resolve_template_roots(locations: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let candidates: Vec<PathBuf> = locations
        .iter()
        .map(|location| location.join(TEMPLATE_FOLDER_NAME))
        .collect();
    let roots: Vec<PathBuf> = candidates.iter().filter(|c| c.is_dir()).cloned().collect();

    if roots.is_empty() {
        return Err(Error::NoTemplateRoots { candidates });
    }
    for root in &roots {
        tracing::debug!(root = %root.display(), "Found template root");
    }
    Ok(roots)
}
