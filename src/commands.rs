//! CLI command implementations

use anyhow::Context;
use classmap_core::{write_views, Analyzer, UsageReport};
use classmap_ingest::{find_export_files, load_declarations, Config, ExportSources};
use std::path::{Path, PathBuf};

/// Options of the `analyze` command after clap parsing.
pub struct AnalyzeArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub pretty: bool,
    pub hide_utility: bool,
    pub no_usages: bool,
    pub threads: Option<usize>,
}

pub fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    tracing::info!("Analyzing exports in {}", args.input.display());

    let config = load_config(&args)?;
    let files = find_export_files(&args.input, &config.input.extension)
        .with_context(|| format!("Failed to discover exports in {}", args.input.display()))?;
    if files.is_empty() {
        tracing::warn!("No .{} export files found", config.input.extension);
    }

    let declarations = load_declarations(&files).context("Failed to load declarations")?;
    let mut analyzer = Analyzer::new(declarations);

    let resolved = analyzer.resolve();
    tracing::info!(
        "Resolved {} connections, {} utility classes, {} shortcuts, {} overrides",
        resolved.connections,
        resolved.utility,
        resolved.shortcuts,
        resolved.overrides
    );

    if config.analysis.usages {
        let sources = ExportSources::new(files);
        let report = scan_bodies(&mut analyzer, &sources, config.analysis.threads)?;
        tracing::info!("Found {} usages in {} units", report.usages, report.units);
    }

    let pruned = analyzer.prune();
    if !pruned.is_empty() {
        tracing::info!(
            "Pruned {} classes and {} namespaces",
            pruned.classes,
            pruned.namespaces
        );
    }

    let views = analyzer.build_views(&config.view_options());
    let written = write_views(&views, &args.output, config.output.pretty)
        .with_context(|| format!("Failed to write views to {}", args.output.display()))?;
    tracing::info!("Wrote {} views to {}", written, args.output.display());

    Ok(())
}

/// Config file from `--config`, or `classmap.toml` beside the input, with
/// command-line flags layered on top.
fn load_config(args: &AnalyzeArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(config_dir(&args.input))?,
    };

    if args.pretty {
        config.output.pretty = true;
    }
    if args.hide_utility {
        config.views.hide_utility = true;
    }
    if args.no_usages {
        config.analysis.usages = false;
    }
    if let Some(threads) = args.threads {
        config.analysis.threads = threads;
    }
    Ok(config)
}

fn config_dir(input: &Path) -> &Path {
    if input.is_file() {
        input.parent().unwrap_or(input)
    } else {
        input
    }
}

fn scan_bodies(
    analyzer: &mut Analyzer,
    sources: &ExportSources,
    threads: usize,
) -> anyhow::Result<UsageReport> {
    let report = if threads == 0 {
        analyzer.detect_usages(sources)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build usage detection thread pool")?;
        pool.install(|| analyzer.detect_usages(sources))
    };
    report.context("Usage detection failed")
}
