//! fppt-ctl: expand F Prime topology templates.
//!
//! Scans the given topology files for `include "<base>.<tag>.fppt"` lines,
//! renders each invocation from the unique `topology-templates/<base>.fppt`
//! found across the search path, and repeats on the generated files. On
//! success every produced path is printed to stdout, one per line.

mod cli_config;
mod output;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use fppt_core::{BuildState, SearchPath, TeraRenderer, TopologyBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fppt-ctl", version)]
#[command(about = "Expand topology templates found through include lines")]
#[command(styles = output::clap_styles())]
struct Cli {
    /// Locations of F Prime packages/libraries to search for topology-templates/
    #[arg(
        short = 'l',
        long = "search-path",
        visible_alias = "fprime-locations",
        value_name = "DIR",
        num_args = 1..,
        required = true
    )]
    search_paths: Vec<PathBuf>,

    /// Root topology files to scan
    #[arg(
        short = 't',
        long = "topology-files",
        value_name = "FILE",
        num_args = 1..,
        required = true
    )]
    topology_files: Vec<PathBuf>,

    /// Offset step reserved for each rendered template instance
    #[arg(short = 'm', long = "offset-multiple", value_name = "N")]
    offset_multiple: i64,

    /// Offset handed to the first rendered template instance
    #[arg(long, value_name = "N", default_value_t = 0)]
    start_offset: i64,

    /// TOML file whose top-level entries become template parameters
    /// (defaults to ./.fppt.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests are not failures.
            let failed = e.use_stderr();
            e.print().ok();
            return if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(produced) => {
            for path in produced {
                output::plain(path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<BTreeSet<PathBuf>> {
    let config = cli_config::load_template_config(cli.config.as_deref())?;

    let search_path = SearchPath::new(cli.search_paths.iter().cloned());
    let renderer = TeraRenderer::load(&search_path.template_roots()?)?;
    let builder = TopologyBuilder::new(search_path, renderer, config);

    let mut state = BuildState::new(cli.start_offset, cli.offset_multiple);
    let output = match builder.build_all(&cli.topology_files, &mut state) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(kind = %e.kind(), "Build failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        renders = output.renders().len(),
        produced = output.produced().len(),
        "Template expansion complete"
    );
    Ok(output.into_produced())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fppt_core={level},fppt_ctl={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
