use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use mimalloc::MiMalloc;
use modgraph_analyze::{build_dsm, compute_metrics, detect_cycles};
use modgraph_extract::{resolve_project, FilterConfig};
use modgraph_graph::build_graph;
use modgraph_schemas::AnalysisReport;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Analyze the module and declaration dependency structure of a Rust
/// project: dependency graph, cycles, and coupling metrics.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project and emit the JSON report
    ///
    /// Resolves the module tree (workspace members included), builds the
    /// dependency graph, detects cycles, and computes coupling metrics.
    Analyze {
        /// Path to the project root (directory containing Cargo.toml)
        #[arg(default_value = ".")]
        project_path: PathBuf,

        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exclude test files, tests directories, and #[cfg(test)] modules
        #[arg(long)]
        no_tests: bool,

        /// Glob patterns of files to exclude (repeatable)
        #[arg(long = "exclude")]
        exclude_patterns: Vec<String>,

        /// Glob patterns files must match to be included (repeatable)
        #[arg(long = "include")]
        include_patterns: Vec<String>,
    },

    /// Emit the module-level design-structure matrix as JSON
    Dsm {
        /// Path to the project root (directory containing Cargo.toml)
        #[arg(default_value = ".")]
        project_path: PathBuf,

        /// Exclude test files, tests directories, and #[cfg(test)] modules
        #[arg(long)]
        no_tests: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Structured logging goes to stderr so JSON on stdout stays pipeable.
    // Default to warn, allowlist our crates at the requested level.
    const CRATES: &[&str] = &[
        "modgraph",
        "modgraph_extract",
        "modgraph_graph",
        "modgraph_analyze",
        "modgraph_schemas",
    ];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            project_path,
            output,
            no_tests,
            exclude_patterns,
            include_patterns,
        } => {
            let mut config = if no_tests {
                FilterConfig::no_tests()
            } else {
                FilterConfig::default()
            };
            config.exclude_patterns = exclude_patterns;
            config.include_patterns = include_patterns;

            let crates = resolve_project(&project_path, &config)?;
            let graph = build_graph(&crates);
            let cycles = detect_cycles(&graph);
            let metrics = compute_metrics(&crates, &graph, &cycles);
            let report = AnalysisReport {
                crates,
                graph,
                cycles,
                metrics,
            };

            let stdout = std::io::stdout();
            let mut writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(stdout.lock()),
            };
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
            Ok(())
        }
        Commands::Dsm {
            project_path,
            no_tests,
        } => {
            let config = if no_tests {
                FilterConfig::no_tests()
            } else {
                FilterConfig::default()
            };
            let crates = resolve_project(&project_path, &config)?;
            let graph = build_graph(&crates);
            let dsm = build_dsm(&graph);

            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dsm)?;
            writeln!(writer)?;
            Ok(())
        }
    }
}
