//! Recursive expansion of F Prime topology templates.
//!
//! Topology files declare `include "<target>"` lines. A target ending in
//! `.fppt` is a template invocation: its file name `<base>.<tag>.fppt` names a
//! definition `<base>.fppt` living under `topology-templates/` in exactly one
//! search location. The definition is rendered with a deterministic parameter
//! set, written to the invocation path, and the written file is scanned again
//! as new input until no invocations remain.
//!
//! # Modules
//!
//! - [`search_path`] — Definition and template-root resolution across search locations
//! - [`scanner`] — `include` line extraction and invocation/include classification
//! - [`allocator`] — Per-definition instance indices and the run-wide offset
//! - [`renderer`] — Tera-backed rendering behind the [`TemplateRenderer`] trait
//! - [`writer`] — Output writing and snippet propagation
//! - [`engine`] — Depth-first traversal tying the pieces together
//!
//! # Example
//!
//! ```no_run
//! use fppt_core::{BuildState, SearchPath, TeraRenderer, TopologyBuilder};
//!
//! # fn main() -> fppt_core::Result<()> {
//! let search_path = SearchPath::new(["lib/fprime", "project"]);
//! let renderer = TeraRenderer::load(&search_path.template_roots()?)?;
//! let builder = TopologyBuilder::new(search_path, renderer, toml::Table::new());
//!
//! let mut state = BuildState::new(0, 0x100);
//! let output = builder.build_all(&["project/Top/topology.fpp"], &mut state)?;
//! for path in output.produced() {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod scanner;
pub mod search_path;
pub mod writer;

mod filters;

pub use allocator::InstanceAllocator;
pub use engine::{BuildOutput, BuildState, RenderRecord, TopologyBuilder};
pub use error::{Error, ErrorKind, Result};
pub use renderer::{TemplateParameters, TemplateRenderer, TeraRenderer};
pub use scanner::ScanResult;
pub use search_path::{SearchPath, TemplateInfo};
