//! Config file discovery and loading.
//!
//! Precedence:
//! 1. The file passed with `--config` (must exist)
//! 2. `./.fppt.toml` (project-local, optional)
//! 3. An empty table

use std::path::{Path, PathBuf};

use super::ConfigError;

const CONFIG_FILENAME: &str = ".fppt.toml";

/// Load the template configuration relative to the current directory.
pub(crate) fn load_template_config(explicit: Option<&Path>) -> Result<toml::Table, ConfigError> {
    load_template_config_from(explicit, Path::new("."))
}

fn load_template_config_from(
    explicit: Option<&Path>,
    work_dir: &Path,
) -> Result<toml::Table, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file(work_dir) {
            Some(path) => path,
            None => {
                tracing::debug!("No template config found, using an empty table");
                return Ok(toml::Table::new());
            }
        },
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let table = parse_template_config(&contents, &path)?;
    tracing::debug!(path = %path.display(), entries = table.len(), "Loaded template config");
    Ok(table)
}

fn parse_template_config(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn find_config_file(work_dir: &Path) -> Option<PathBuf> {
    let local = work_dir.join(CONFIG_FILENAME);
    local.is_file().then_some(local)
}
