//! Template rendering.
//!
//! The engine only depends on [`TemplateRenderer`]; [`TeraRenderer`] is the
//! Tera-backed implementation used by the CLI.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tera::{Context, Template, Tera};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::filters;
use crate::search_path::SNIPPET_FOLDER_NAME;

/// Parameters handed to every template body.
///
/// The three computed values always shadow configuration entries of the same
/// name.
#[derive(Debug, Clone, Copy)]
pub struct TemplateParameters<'a> {
    pub template_name: &'a str,
    pub template_index: u64,
    pub template_offset: i64,
    pub config: &'a toml::Table,
}

impl TemplateParameters<'_> {
    /// Build the Tera context: configuration first, computed keys last.
    pub fn to_context(&self) -> Context {
        let mut context = Context::new();
        for (key, value) in self.config {
            context.insert(key.as_str(), value);
        }
        context.insert("template_name", self.template_name);
        context.insert("template_index", &self.template_index);
        context.insert("template_offset", &self.template_offset);
        context
    }
}

/// Renders a template body, looked up by definition name, with parameters.
pub trait TemplateRenderer {
    fn render(&self, definition_name: &str, params: &TemplateParameters<'_>) -> Result<String>;
}

/// Tera environment over the files beneath a set of template roots.
///
/// Every file is parsed on its own. A body that fails to parse, or that
/// extends or imports macros from such a body, is set aside and only reported
/// when it is rendered, so one broken template does not block the others.
#[derive(Debug)]
pub struct TeraRenderer {
    tera: Tera,
    unavailable: BTreeMap<String, Unavailable>,
}

#[derive(Debug)]
enum Unavailable {
    Unreadable {
        path: PathBuf,
        kind: io::ErrorKind,
        detail: String,
    },
    Malformed { path: PathBuf, detail: String },
    MissingDependency { dependency: String },
}

struct Parsed {
    body: String,
    dependencies: Vec<String>,
}

impl TeraRenderer {
    /// Register every file under `roots` by its root-relative name.
    ///
    /// The `snippets/` subtree of each root is skipped. Names use `/` as the
    /// separator so bodies can `{% include %}` one another portably. When two
    /// roots provide the same name the first root wins.
    pub fn load(roots: &[PathBuf]) -> Result<Self> {
        let mut parsed: BTreeMap<String, Parsed> = BTreeMap::new();
        let mut unavailable: BTreeMap<String, Unavailable> = BTreeMap::new();

        for root in roots {
            let walker = WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_snippet_dir(e));

            for entry in walker {
                let entry = entry.map_err(|e| walk_error(root, e))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Some(name) = template_name(root, path) else {
                    continue;
                };
                if parsed.contains_key(&name) || unavailable.contains_key(&name) {
                    tracing::debug!(
                        template = %name,
                        path = %path.display(),
                        "Template name already provided by an earlier root"
                    );
                    continue;
                }

                match parse_file(&name, path) {
                    Ok(template) => {
                        tracing::debug!(template = %name, path = %path.display(), "Registered template");
                        parsed.insert(name, template);
                    }
                    Err(reason) => {
                        tracing::debug!(template = %name, path = %path.display(), "Template set aside");
                        unavailable.insert(name, reason);
                    }
                }
            }
        }

        // Drop bodies whose parent or macro file did not make it, until stable.
        loop {
            let broken: Vec<(String, String)> = parsed
                .iter()
                .filter_map(|(name, template)| {
                    template
                        .dependencies
                        .iter()
                        .find(|dep| !parsed.contains_key(dep.as_str()))
                        .map(|dep| (name.clone(), dep.clone()))
                })
                .collect();
            if broken.is_empty() {
                break;
            }
            for (name, dependency) in broken {
                parsed.remove(&name);
                unavailable.insert(name, Unavailable::MissingDependency { dependency });
            }
        }

        let mut tera = Self::empty_tera();
        tera.add_raw_templates(parsed.iter().map(|(name, template)| (name, &template.body)))
            .map_err(|source| Error::TemplateLoad {
                paths: roots.to_vec(),
                source,
            })?;
        Ok(Self { tera, unavailable })
    }

    /// Build a renderer from in-memory `(name, body)` pairs.
    pub fn from_raw_templates<'a, I>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Self::empty_tera();
        tera.add_raw_templates(templates)
            .map_err(|source| Error::TemplateLoad {
                paths: Vec::new(),
                source,
            })?;
        Ok(Self {
            tera,
            unavailable: BTreeMap::new(),
        })
    }

    /// Names of the templates that can be rendered.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }

    fn empty_tera() -> Tera {
        let mut tera = Tera::default();
        // Topology sources are not HTML.
        tera.autoescape_on(vec![]);
        filters::register(&mut tera);
        tera
    }

    /// The load-time failure behind `name`, following dependency links.
    fn unavailable_error(&self, name: &str) -> Option<Error> {
        let mut current = name;
        for _ in 0..=self.unavailable.len() {
            match self.unavailable.get(current)? {
                Unavailable::Unreadable { path, kind, detail } => {
                    return Some(Error::io(path, io::Error::new(*kind, detail.clone())));
                }
                Unavailable::Malformed { path, detail } => {
                    return Some(Error::TemplateLoad {
                        paths: vec![path.clone()],
                        source: tera::Error::msg(detail),
                    });
                }
                Unavailable::MissingDependency { dependency } => {
                    if !self.unavailable.contains_key(dependency) {
                        return Some(Error::Render {
                            template: name.to_string(),
                            source: tera::Error::msg(format!(
                                "'{current}' depends on '{dependency}', which is not loaded"
                            )),
                        });
                    }
                    current = dependency.as_str();
                }
            }
        }
        None
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, definition_name: &str, params: &TemplateParameters<'_>) -> Result<String> {
        if let Some(err) = self.unavailable_error(definition_name) {
            return Err(err);
        }
        self.tera
            .render(definition_name, &params.to_context())
            .map_err(|source| Error::Render {
                template: definition_name.to_string(),
                source,
            })
    }
}

fn parse_file(name: &str, path: &Path) -> std::result::Result<Parsed, Unavailable> {
    let body = fs::read_to_string(path).map_err(|e| Unavailable::Unreadable {
        path: path.to_path_buf(),
        kind: e.kind(),
        detail: e.to_string(),
    })?;
    let template = Template::new(name, None, &body).map_err(|e| Unavailable::Malformed {
        path: path.to_path_buf(),
        detail: format!("failed to parse '{name}': {}", error_chain(&e)),
    })?;

    let mut dependencies: Vec<String> = template.parent.into_iter().collect();
    dependencies.extend(template.imported_macro_files.into_iter().map(|(file, _)| file));
    Ok(Parsed { body, dependencies })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_snippet_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == SNIPPET_FOLDER_NAME
}

fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop while walking templates"));
    Error::Io { path, source }
}
