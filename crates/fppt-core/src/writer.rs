//! Writing rendered invocations and propagating snippets.
//!
//! Snippets live in `topology-templates/snippets/` next to a definition and are
//! copied into `snippets/` next to every output rendered from it. Nothing is
//! rolled back on failure.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::search_path::SNIPPET_FOLDER_NAME;

/// Write `rendered` to `output`, copying the definition's snippets beside it.
///
/// Returns the destination path of every copied snippet, in walk order.
pub fn write_artifact(output: &Path, rendered: &str, definition: &Path) -> Result<Vec<PathBuf>> {
    let output_dir = parent_dir(output);
    fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let snippet_source = parent_dir(definition).join(SNIPPET_FOLDER_NAME);
    let snippet_dest = output_dir.join(SNIPPET_FOLDER_NAME);
    fs::create_dir_all(&snippet_dest).map_err(|e| Error::io(&snippet_dest, e))?;

    let copied = copy_snippets(&snippet_source, &snippet_dest)?;

    if output.is_dir() {
        return Err(Error::io(
            output,
            std::io::Error::other("output path is an existing directory"),
        ));
    }
    fs::write(output, rendered).map_err(|e| Error::io(output, e))?;
    tracing::debug!(output = %output.display(), bytes = rendered.len(), "Wrote rendered template");

    Ok(copied)
}

/// Recursively copy every file below `source` into `dest`, preserving
/// relative paths and overwriting existing files. A missing `source` copies
/// nothing.
pub fn copy_snippets(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        return Ok(Vec::new());
    }

    let mut copied = Vec::new();
    let walker = WalkDir::new(source).follow_links(true).sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop while walking snippets"));
            Error::io(path, io)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        let target_dir = parent_dir(&target);
        fs::create_dir_all(target_dir).map_err(|e| Error::io(target_dir, e))?;
        fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;

        tracing::info!(
            snippet = %relative.display(),
            dest = %target.display(),
            "Copied snippet"
        );
        copied.push(target);
    }

    Ok(copied)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}
