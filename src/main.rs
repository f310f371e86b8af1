//! CLI entry point for `eml-signals`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use eml_signals::config::Config;
use eml_signals::pipeline::{self, IngestOptions};

#[derive(Parser)]
#[command(name = "eml-signals", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(long, global = true, env = "EML_SIGNALS_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse EML files into a records file
    Parse {
        #[command(flatten)]
        ingest: IngestArgs,
    },
    /// Extract header features from a records file
    Headers {
        #[arg(short, long, value_name = "RECORDS")]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
    },
    /// Extract body features and URLs from a records file
    Body {
        #[arg(short, long, value_name = "RECORDS")]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write `{email_id, URLs}` lines to this file
        #[arg(long, value_name = "FILE")]
        urls_output: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
    },
    /// Parse, then extract body and header features next to the records file
    Run {
        #[command(flatten)]
        ingest: IngestArgs,
    },
}

#[derive(clap::Args)]
struct IngestArgs {
    /// EML files or directories of EML files
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Records output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only process a random contiguous window of N files
    #[arg(short, long, value_name = "N")]
    sample: Option<usize>,

    /// Truncate output files instead of appending
    #[arg(long)]
    overwrite: bool,

    /// Log header names and a body preview for every message
    #[arg(short, long)]
    debug: bool,
}

impl IngestArgs {
    fn options(&self, config: &Config) -> IngestOptions {
        IngestOptions {
            sample: self.sample,
            overwrite: self.overwrite || config.output.overwrite,
            debug: self.debug,
            ..IngestOptions::from_config(config)
        }
    }

    fn output(&self, config: &Config) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.output.records_file.clone())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let log_level = match cli.verbose {
        0 => config.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    match cli.command {
        Commands::Parse { ingest } => cmd_parse(&ingest, &config),
        Commands::Headers {
            input,
            output,
            overwrite,
        } => cmd_headers(&input, output, overwrite || config.output.overwrite),
        Commands::Body {
            input,
            output,
            urls_output,
            overwrite,
        } => cmd_body(
            &input,
            output,
            urls_output.as_deref(),
            overwrite || config.output.overwrite,
        ),
        Commands::Run { ingest } => cmd_run(&ingest, &config),
    }
}

fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn cmd_parse(args: &IngestArgs, config: &Config) -> anyhow::Result<()> {
    let output = args.output(config);
    let count = pipeline::ingest_files(&args.input, &output, &args.options(config))
        .with_context(|| format!("Failed to parse emails into {}", output.display()))?;

    println!("Parsed {count} emails into {}", output.display());
    Ok(())
}

fn cmd_headers(input: &Path, output: Option<PathBuf>, overwrite: bool) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| pipeline::sibling_path(input, "header_features"));
    let count = pipeline::extract_header_features_file(input, &output, overwrite)
        .with_context(|| format!("Failed to extract header features from {}", input.display()))?;

    println!("Header Features Filename: {} ({count} lines)", output.display());
    Ok(())
}

fn cmd_body(
    input: &Path,
    output: Option<PathBuf>,
    urls_output: Option<&Path>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| pipeline::sibling_path(input, "body_features"));
    let count = pipeline::extract_body_features_file(input, &output, urls_output, overwrite)
        .with_context(|| format!("Failed to extract body features from {}", input.display()))?;

    println!("Body Features Filename: {} ({count} lines)", output.display());
    if let Some(urls_output) = urls_output {
        println!("URL Features Filename: {}", urls_output.display());
    }
    Ok(())
}

fn cmd_run(args: &IngestArgs, config: &Config) -> anyhow::Result<()> {
    let output = args.output(config);
    let outputs = pipeline::run_pipeline(&args.input, &output, &args.options(config))
        .context("Pipeline run failed")?;

    println!("Parsed Filename: {}", outputs.records.display());
    println!("Body Features Filename: {}", outputs.body_features.display());
    println!("URL Features Filename: {}", outputs.urls.display());
    println!("Header Features Filename: {}", outputs.header_features.display());
    Ok(())
}
