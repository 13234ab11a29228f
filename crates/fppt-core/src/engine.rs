//! Depth-first expansion of a topology include graph.
//!
//! For every visited file, all of its invocations are rendered and written
//! first, in line order. The freshly written outputs and then the file's plain
//! includes are visited next, each fully before its next sibling. A pending
//! stack stands in for call-stack recursion; children are pushed in reverse so
//! the visit order is the recursive pre-order.
//!
//! Index and offset state lives in [`BuildState`] and is shared by every
//! branch, so values are unique and monotonic across the whole run. Template
//! graphs must be acyclic; cycles are not detected.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::allocator::InstanceAllocator;
use crate::error::Result;
use crate::renderer::{TemplateParameters, TemplateRenderer};
use crate::scanner;
use crate::search_path::SearchPath;
use crate::writer;

/// Mutable bookkeeping for one run.
#[derive(Debug, Clone)]
pub struct BuildState {
    allocator: InstanceAllocator,
}

impl BuildState {
    pub fn new(start_offset: i64, step: i64) -> Self {
        Self {
            allocator: InstanceAllocator::new(start_offset, step),
        }
    }

    pub fn allocator(&self) -> &InstanceAllocator {
        &self.allocator
    }
}

/// One rendered invocation, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    pub invocation: PathBuf,
    pub definition: PathBuf,
    pub template_name: String,
    pub template_index: u64,
    pub template_offset: i64,
}

/// Everything a build touched.
#[derive(Debug, Default)]
pub struct BuildOutput {
    produced: BTreeSet<PathBuf>,
    renders: Vec<RenderRecord>,
}

impl BuildOutput {
    /// Definitions used, snippets copied and invocations written, deduplicated.
    pub fn produced(&self) -> &BTreeSet<PathBuf> {
        &self.produced
    }

    pub fn renders(&self) -> &[RenderRecord] {
        &self.renders
    }

    pub fn into_produced(self) -> BTreeSet<PathBuf> {
        self.produced
    }
}

/// Expands topology files against a search path with a given renderer.
#[derive(Debug)]
pub struct TopologyBuilder<R> {
    search_path: SearchPath,
    renderer: R,
    config: toml::Table,
}

impl<R: TemplateRenderer> TopologyBuilder<R> {
    pub fn new(search_path: SearchPath, renderer: R, config: toml::Table) -> Self {
        Self {
            search_path,
            renderer,
            config,
        }
    }

    /// Expand everything reachable from `root`.
    pub fn build(&self, root: impl AsRef<Path>, state: &mut BuildState) -> Result<BuildOutput> {
        let mut output = BuildOutput::default();
        self.build_into(root.as_ref(), state, &mut output)?;
        Ok(output)
    }

    /// Expand each root in turn, sharing `state` and the produced set.
    pub fn build_all<P: AsRef<Path>>(
        &self,
        roots: &[P],
        state: &mut BuildState,
    ) -> Result<BuildOutput> {
        let mut output = BuildOutput::default();
        for root in roots {
            self.build_into(root.as_ref(), state, &mut output)?;
        }
        Ok(output)
    }

    fn build_into(&self, root: &Path, state: &mut BuildState, output: &mut BuildOutput) -> Result<()> {
        let mut pending = vec![root.to_path_buf()];

        while let Some(current) = pending.pop() {
            let scan = scanner::scan(&current)?;

            for invocation in &scan.invocations {
                self.expand(invocation, state, output)?;
            }

            pending.extend(scan.includes.into_iter().rev());
            pending.extend(scan.invocations.into_iter().rev());
        }

        Ok(())
    }

    /// Resolve, render and write a single invocation.
    fn expand(&self, invocation: &Path, state: &mut BuildState, output: &mut BuildOutput) -> Result<()> {
        let info = self.search_path.resolve_definition(invocation)?;
        let template_offset = state.allocator.offset()?;
        let template_index = state.allocator.next_index(&info.definition_name);

        let params = TemplateParameters {
            template_name: &info.template_name,
            template_index,
            template_offset,
            config: &self.config,
        };
        let rendered = self.renderer.render(&info.definition_name, &params)?;
        let snippets = writer::write_artifact(invocation, &rendered, &info.definition_path)?;
        state.allocator.advance();

        tracing::info!(
            invocation = %invocation.display(),
            definition = %info.definition_name,
            template_name = %info.template_name,
            template_index,
            template_offset,
            "Rendered template"
        );

        output.produced.insert(normalize(&info.definition_path));
        output.produced.insert(normalize(invocation));
        output.produced.extend(snippets.iter().map(|p| normalize(p)));
        output.renders.push(RenderRecord {
            invocation: invocation.to_path_buf(),
            definition: info.definition_path,
            template_name: info.template_name,
            template_index,
            template_offset,
        });
        Ok(())
    }
}

/// Lexically drop `.` segments and fold `name/..` pairs, so one file reached
/// through different spellings is listed once. The filesystem is not consulted.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}
