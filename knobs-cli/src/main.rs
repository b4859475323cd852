//! Knobs CLI - explore health-policy control knob scenarios from the terminal

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr, rendered output to stdout or the --output file

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use knobs_core::config::{self, ResolvedConfig};
use knobs_core::gauge::Gauge;
use knobs_core::metric::{Metric, MetricTier};
use knobs_core::report::{render_comparison_text, render_gauge_text};
use knobs_core::{
    compare_scenarios_with_threshold, knob_view, overview_view, render_html, render_json,
    render_overview_html, render_overview_text, render_text, Dataset, Knob, SelectionEvent,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "knobs")]
#[command(about = "Explore health-policy control knob scenarios, gauges and comparisons")]
#[command(version = env!("KNOBS_VERSION"))]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a knob page for a selection
    Show {
        /// Knob key (financing, payment, organization, regulation, behavior)
        knob: String,

        /// Selection events replayed from idle, in order
        /// (scenario:<id>, metric:<key>, compare, compare:on, compare:off)
        #[arg(long = "event", short = 'e')]
        events: Vec<String>,

        /// Output format (default: from config, else text)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Output file path (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        content: ContentArgs,
    },
    /// Compare two scenarios of a knob side by side
    Compare {
        /// Knob key
        knob: String,

        /// Scenario id shown as A
        a: String,

        /// Scenario id shown as B
        b: String,

        /// Divergence threshold (overrides config file)
        #[arg(long)]
        threshold: Option<u32>,

        /// Output format (default: from config, else text)
        #[arg(long)]
        format: Option<OutputFormat>,

        #[command(flatten)]
        content: ContentArgs,
    },
    /// Compute a single gauge from effect and risk texts
    Gauge {
        /// Intended effect text (e.g. "High access")
        #[arg(long)]
        effect: Option<String>,

        /// Systemic risk text (e.g. "Warning: cost escalation")
        #[arg(long)]
        risk: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Render the framework overview
    Overview {
        /// Selection events replayed from idle (only metric selection applies)
        #[arg(long = "event", short = 'e')]
        events: Vec<String>,

        /// Output format (default: from config, else text)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Output file path (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        content: ContentArgs,
    },
    /// List the empirical literature filed under a knob
    Literature {
        /// Knob key
        knob: String,

        /// Output format (default: from config, else text)
        #[arg(long)]
        format: Option<OutputFormat>,

        #[command(flatten)]
        content: ContentArgs,
    },
    /// List the performance metric catalog
    Metrics,
    /// Validate or show the configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct ContentArgs {
    /// Content directory (overrides config file)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Show {
            knob,
            events,
            format,
            output,
            content,
        } => {
            let knob: Knob = knob.parse()?;
            let events = parse_events(&events)?;
            let (config, dataset) = load_content(&content)?;

            let view = knob_view(&dataset, knob, &events, &config)?;
            match resolve_format(format, &config)? {
                OutputFormat::Text => emit(output.as_deref(), &render_text(&view))?,
                OutputFormat::Json => emit(output.as_deref(), &render_json(&view))?,
                OutputFormat::Html => emit(output.as_deref(), &render_html(&view))?,
            }
        }
        Commands::Compare {
            knob,
            a,
            b,
            threshold,
            format,
            content,
        } => {
            let knob: Knob = knob.parse()?;
            let (config, dataset) = load_content(&content)?;
            let knob_content = dataset
                .knob(knob)
                .ok_or_else(|| anyhow::anyhow!("no content loaded for knob: {}", knob))?;

            let scenario_a = knob_content
                .scenario(&a)
                .ok_or_else(|| anyhow::anyhow!("unknown scenario for {}: {}", knob, a))?;
            let scenario_b = knob_content
                .scenario(&b)
                .ok_or_else(|| anyhow::anyhow!("unknown scenario for {}: {}", knob, b))?;
            if a == b {
                anyhow::bail!("cannot compare a scenario with itself: {}", a);
            }

            let threshold = threshold.unwrap_or(config.divergence_threshold);
            if !(1..=4).contains(&threshold) {
                anyhow::bail!("--threshold must be between 1 and 4 (got {})", threshold);
            }

            let comparison = compare_scenarios_with_threshold(scenario_a, scenario_b, threshold);
            match resolve_format(format, &config)? {
                OutputFormat::Text => print!("{}", render_comparison_text(&comparison)),
                OutputFormat::Json => println!("{}", render_json(&comparison)),
                OutputFormat::Html => {
                    anyhow::bail!("HTML format is not supported for compare; use `show` with compare events")
                }
            }
        }
        Commands::Gauge {
            effect,
            risk,
            format,
        } => {
            let gauge = Gauge::from_texts(effect.as_deref(), risk.as_deref());
            match format {
                OutputFormat::Text => print!("{}", render_gauge_text(&gauge)),
                OutputFormat::Json => println!("{}", render_json(&gauge)),
                OutputFormat::Html => anyhow::bail!("HTML format is not supported for gauge"),
            }
        }
        Commands::Overview {
            events,
            format,
            output,
            content,
        } => {
            let events = parse_events(&events)?;
            let (config, dataset) = load_content(&content)?;

            let view = overview_view(&dataset, &events, &config);
            match resolve_format(format, &config)? {
                OutputFormat::Text => emit(output.as_deref(), &render_overview_text(&view))?,
                OutputFormat::Json => emit(output.as_deref(), &render_json(&view))?,
                OutputFormat::Html => emit(output.as_deref(), &render_overview_html(&view))?,
            }
        }
        Commands::Literature {
            knob,
            format,
            content,
        } => {
            let knob: Knob = knob.parse()?;
            let (config, dataset) = load_content(&content)?;
            let papers = dataset.papers_for_knob(knob);

            match resolve_format(format, &config)? {
                OutputFormat::Text => {
                    if papers.is_empty() {
                        println!("No literature filed under {}.", knob.label());
                    }
                    for paper in papers {
                        println!(
                            "{} {} ({}). {}",
                            paper.year, paper.authors, paper.country, paper.title
                        );
                        println!("     {}", paper.scholar_url());
                    }
                }
                OutputFormat::Json => println!("{}", render_json(&papers)),
                OutputFormat::Html => {
                    anyhow::bail!("HTML format is not supported for literature")
                }
            }
        }
        Commands::Metrics => {
            for tier in [MetricTier::Intermediate, MetricTier::Goal] {
                println!("{}:", tier.title());
                for metric in Metric::of_tier(tier) {
                    println!("  {:<24} {}", metric.key(), metric.label());
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Content:");
                println!("  data_dir: {}", resolved.data_dir.display());
                println!("  show_literature: {}", resolved.show_literature);
                println!();
                println!("Comparison:");
                println!("  divergence_threshold: {}", resolved.divergence_threshold);
                println!();
                println!("Output:");
                println!("  default_format: {}", resolved.default_format);
                println!(
                    "  overview knobs: {}",
                    resolved
                        .visible_knobs()
                        .iter()
                        .map(Knob::key)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        },
    }

    Ok(())
}

/// Route logs to stderr; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve config and load the content bundle it points at
fn load_content(args: &ContentArgs) -> anyhow::Result<(ResolvedConfig, Dataset)> {
    let project_root = std::env::current_dir()?;
    let mut resolved = config::load_and_resolve(&project_root, args.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(ref data) = args.data {
        resolved.data_dir = data.clone();
    }

    let dataset = Dataset::load(&resolved.data_dir)
        .with_context(|| format!("failed to load content from {}", resolved.data_dir.display()))?;
    Ok((resolved, dataset))
}

fn parse_events(tokens: &[String]) -> anyhow::Result<Vec<SelectionEvent>> {
    tokens
        .iter()
        .map(|t| t.parse::<SelectionEvent>())
        .collect()
}

/// --format flag, else the configured default
fn resolve_format(
    flag: Option<OutputFormat>,
    config: &ResolvedConfig,
) -> anyhow::Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format),
        None => OutputFormat::from_str(&config.default_format, true)
            .map_err(|e| anyhow::anyhow!("invalid default_format in config: {}", e)),
    }
}

/// Print to stdout, or write the file when a path is given
fn emit(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            write_file_atomic(path, content)?;
            println!("Output written to: {}", path.display());
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

/// Write a file with the atomic temp + rename pattern
fn write_file_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_in_order() {
        let tokens = vec!["compare".to_string(), "scenario:capitation".to_string()];
        let events = parse_events(&tokens).unwrap();
        assert_eq!(
            events,
            vec![
                SelectionEvent::ToggleCompare,
                SelectionEvent::SelectScenario("capitation".to_string()),
            ]
        );
        assert!(parse_events(&["metric:nope".to_string()]).is_err());
    }

    #[test]
    fn test_format_flag_overrides_config() {
        let config = ResolvedConfig {
            default_format: "json".to_string(),
            ..ResolvedConfig::defaults().unwrap()
        };
        assert!(resolve_format(None, &config).unwrap() == OutputFormat::Json);
        assert!(resolve_format(Some(OutputFormat::Html), &config).unwrap() == OutputFormat::Html);
    }

    #[test]
    fn test_write_file_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages").join("payment.html");
        write_file_atomic(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
        assert!(!path.with_extension("tmp").exists());
    }
}
