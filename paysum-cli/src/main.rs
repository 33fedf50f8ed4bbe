use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paysum_core::{format_timestamp, Dataset};
use paysum_ingest::{
    default_patterns, locate_header, AlipayAdapter, DatasetMerger, DirectoryDiscovery,
    FileOutcome, MergeReport, SourceAdapter, WechatAdapter, ALIPAY_HEADER_KEYWORDS,
};
use paysum_report::{sample_dataset, ReportRenderer, TerminalRenderer};
use std::path::{Path, PathBuf};
use tracing::warn;

mod config;
mod logging;

use config::{config_path, init_config, load_config, Config};

#[derive(Parser, Debug)]
#[command(
    name = "paysum",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PAYSUM_BUILD_SHA"), ")"),
    about = "Merge WeChat Pay and Alipay bill exports into one financial report"
)]
struct Cli {
    /// Config file (default: ./paysum.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for the paysum crates (overrides RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge every export in a directory, show the report and export it
    Report {
        /// Directory holding the exports
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Document name (default: 财务分析报告_<timestamp>.md)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the on-screen report
        #[arg(long, default_value_t = false)]
        no_display: bool,

        /// Use synthetic sample data instead of the directory
        #[arg(long, default_value_t = false)]
        sample: bool,
    },

    /// Run one adapter on one export and print what it produced
    Inspect {
        file: PathBuf,

        /// Platform of the file (inferred from the file name when omitted)
        #[arg(long, value_enum)]
        source: Option<SourceArg>,

        /// Records to print
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Print the 0-based header row of a table file
    Locate {
        file: PathBuf,

        /// Required header keyword; repeatable (default: the Alipay keywords)
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Rows to scan (default from config)
        #[arg(long)]
        window: Option<usize>,
    },

    /// Render the report over synthetic sample data
    Sample {
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        no_display: bool,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config unless one exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SourceArg {
    Wechat,
    Alipay,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg_path = config_path(cli.config.as_deref());

    match cli.command {
        Command::Report {
            dir,
            output,
            no_display,
            sample,
        } => {
            let cfg = load_config(&cfg_path)?;
            let dataset = if sample {
                sample_from(&cfg)
            } else {
                merge_or_sample(&cfg, &dir)?
            };
            render(&cfg, &dataset, output.as_deref(), no_display)?;
        }

        Command::Inspect {
            file,
            source,
            limit,
        } => {
            let cfg = load_config(&cfg_path)?;
            inspect(&cfg, &file, source, limit)?;
        }

        Command::Locate {
            file,
            keywords,
            window,
        } => {
            let cfg = load_config(&cfg_path)?;
            let keywords = if keywords.is_empty() {
                ALIPAY_HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect()
            } else {
                keywords
            };
            let window = window.unwrap_or(cfg.ingest.header_search_window);
            let row = locate_header(&file, keywords.as_slice(), window)
                .with_context(|| format!("locating header in {}", file.display()))?;
            println!("Header row: {row} (keywords: {})", keywords.join(", "));
        }

        Command::Sample { output, no_display } => {
            let cfg = load_config(&cfg_path)?;
            let dataset = sample_from(&cfg);
            render(&cfg, &dataset, output.as_deref(), no_display)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => init_config(&cfg_path)?,
            ConfigCommand::Show => {
                let cfg = load_config(&cfg_path)?;
                println!("# {}", cfg_path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn sample_from(cfg: &Config) -> Dataset {
    let dataset = sample_dataset(cfg.sample.records, cfg.sample.seed);
    println!("Generated {} sample records (seed {})", dataset.len(), cfg.sample.seed);
    dataset
}

fn merger(cfg: &Config, dir: &Path) -> DatasetMerger<DirectoryDiscovery> {
    let patterns = default_patterns(&cfg.discovery.wechat_marker, &cfg.discovery.alipay_marker);
    DatasetMerger::new(DirectoryDiscovery::new(dir, patterns))
        .with_adapter(WechatAdapter::new(cfg.ingest.wechat_header_row))
        .with_adapter(AlipayAdapter::new(cfg.ingest.header_search_window))
}

/// Merge the directory; fall back to sample data when nothing usable is there
fn merge_or_sample(cfg: &Config, dir: &Path) -> Result<Dataset> {
    match merger(cfg, dir).merge() {
        Ok(report) => {
            print_merge_summary(&report);
            Ok(report.dataset)
        }
        Err(e) if e.is_no_data() => {
            warn!(dir = %dir.display(), error = %e, "no usable exports; using sample data");
            println!("No usable exports in {}; falling back to sample data", dir.display());
            Ok(sample_from(cfg))
        }
        Err(e) => Err(e).with_context(|| format!("merging exports in {}", dir.display())),
    }
}

fn print_merge_summary(report: &MergeReport) {
    for file in &report.files {
        match file {
            FileOutcome::Adapted(s) => println!(
                "[{}] {}: kept {} of {} rows (neutral {}, invalid {})",
                s.source,
                s.path.display(),
                s.kept,
                s.rows_read,
                s.neutral_dropped,
                s.invalid_dropped
            ),
            FileOutcome::Skipped {
                path,
                source,
                error,
            } => println!("[{source}] {}: skipped ({error})", path.display()),
        }
    }

    let per_source: Vec<String> = report
        .rows_by_source()
        .into_iter()
        .map(|(source, n)| format!("{source}={n}"))
        .collect();
    println!(
        "Merged {} records ({})",
        report.dataset.len(),
        per_source.join(", ")
    );
}

fn render(cfg: &Config, dataset: &Dataset, output: Option<&Path>, no_display: bool) -> Result<()> {
    let renderer = TerminalRenderer::new(cfg.report_options());
    if !no_display {
        renderer.display(dataset)?;
    }
    let path = renderer.export(dataset, output)?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn infer_source(cfg: &Config, file: &Path) -> Option<SourceArg> {
    let name = file.file_name()?.to_string_lossy();
    if name.contains(&cfg.discovery.wechat_marker) {
        Some(SourceArg::Wechat)
    } else if name.contains(&cfg.discovery.alipay_marker) {
        Some(SourceArg::Alipay)
    } else {
        None
    }
}

fn inspect(cfg: &Config, file: &Path, source: Option<SourceArg>, limit: usize) -> Result<()> {
    let Some(source) = source.or_else(|| infer_source(cfg, file)) else {
        bail!(
            "cannot tell the platform of {} (pass --source wechat|alipay)",
            file.display()
        );
    };

    let adapter: Box<dyn SourceAdapter> = match source {
        SourceArg::Wechat => Box::new(WechatAdapter::new(cfg.ingest.wechat_header_row)),
        SourceArg::Alipay => Box::new(AlipayAdapter::new(cfg.ingest.header_search_window)),
    };
    let report = adapter
        .adapt(file)
        .with_context(|| format!("adapting {}", file.display()))?;

    println!(
        "[{}] {}",
        adapter.source(),
        serde_json::to_string_pretty(&report.summary).context("serialize summary")?
    );

    let shown = Dataset::new(report.records);
    println!("\nFirst {} of {} records:", limit.min(shown.len()), shown.len());
    for r in shown.records().iter().take(limit) {
        println!(
            "- {} | {} | {:.2} | {} | {}",
            format_timestamp(&r.timestamp),
            r.direction.label(),
            r.amount,
            r.category_label(),
            r.payment_label()
        );
    }

    Ok(())
}
