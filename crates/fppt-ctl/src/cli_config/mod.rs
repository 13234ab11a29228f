//! Template configuration for `fppt-ctl`.
//!
//! The configuration is a TOML document whose top-level entries are merged
//! into every template's parameters. It is loaded from `--config` or, failing
//! that, a project-local `.fppt.toml`.

pub(crate) mod loader;

pub(crate) use loader::load_template_config;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read config file {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
