//! # confdiff CLI - Compare configuration versions
//!
//! Loads several versions of a Hadoop-style XML configuration and prints
//! added, renamed, removed and changed properties.
//!
//! ## Usage
//! ```bash
//! # Compare two releases
//! confdiff 0.90/hbase-default.xml 0.90 0.92/hbase-default.xml 0.92
//!
//! # Only print the rendered events, using a custom template
//! confdiff -q -t changes.mustache a.xml 1.0 b.xml 2.0
//!
//! # Show formatted sizes and durations, ignore description edits
//! confdiff -o types.properties -i a.xml 1.0 b.xml 2.0
//!
//! # Machine-readable output
//! confdiff --format json --output report.json a.xml 1.0 b.xml 2.0
//! ```

use clap::{Parser, ValueEnum};
use colored::*;
use confdiff::{
    diff, ConfDiffError, ConfigSource, JsonRenderer, LoaderBuilder, LookupTable, OutputFormat,
    ProgressInfo, Renderer, ReportOptions, ReportWriter, Result, TemplateRenderer,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// confdiff - Compare versions of Hadoop-style XML configurations
#[derive(Parser)]
#[command(name = "confdiff")]
#[command(version)]
#[command(about = "Report added, renamed, removed and changed properties across configuration versions")]
#[command(long_about = None)]
struct Cli {
    /// Configuration files and their version labels, oldest first
    #[arg(required = true, num_args = 2.., value_name = "FILE VERSION")]
    inputs: Vec<String>,

    /// Mustache-style template used to render each event
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Only print data, no info text
    #[arg(short, long)]
    quiet: bool,

    /// Print all info messages with a prefix
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Properties file with the type and unit of configuration keys (<key>=<type>|<unit>)
    #[arg(short = 'o', long, value_name = "FILE")]
    lookup: Option<PathBuf>,

    /// Treat description changes as non-differences
    #[arg(short, long)]
    ignore_description: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: FormatMode,

    /// Write the report to a file instead of the console
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Show progress while loading
    #[arg(long)]
    progress: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum FormatMode {
    Text,
    Json,
    Jsonl,
}

impl From<FormatMode> for OutputFormat {
    fn from(mode: FormatMode) -> Self {
        match mode {
            FormatMode::Text => OutputFormat::Text,
            FormatMode::Json => OutputFormat::Json,
            FormatMode::Jsonl => OutputFormat::JsonLines,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging on stderr so report output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e.user_message());
        std::process::exit(1);
    }
}

/// Main command runner
fn run(cli: Cli) -> Result<()> {
    let sources = parse_sources(&cli.inputs)?;
    let format = OutputFormat::from(cli.format);
    let options = ReportOptions {
        quiet: cli.quiet || format != OutputFormat::Text,
        prefix: cli.prefix.clone(),
        ..Default::default()
    };

    // Info lines are buffered until the output is opened
    let mut preamble = Vec::new();
    let mut builder = LoaderBuilder::new().ignore_description(cli.ignore_description);
    if let Some(path) = &cli.lookup {
        if path.exists() {
            let lookup = LookupTable::load(path)?;
            preamble.push(format!("Using {} lookup entries.", lookup.len()));
            builder = builder.lookup(lookup);
        } else {
            preamble.push("WARNING: Properties file not found, skipping...".to_string());
        }
    }

    let progress = if cli.progress {
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| ConfDiffError::internal(e.to_string()))?,
        );
        let callback_pb = pb.clone();
        builder = builder.progress(Arc::new(move |info: ProgressInfo| {
            callback_pb.set_position(info.processed as u64);
            callback_pb.set_message(info.current_item);
        }));
        Some(pb)
    } else {
        None
    };

    let loader = builder.build();
    let outcome = loader.load_all(&sources);
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for failure in &outcome.failures {
        eprintln!(
            "{} Skipping {}: {}",
            "⚠".yellow().bold(),
            failure.source,
            failure.error.user_message()
        );
    }
    if outcome.configurations.is_empty() {
        return Err(ConfDiffError::NoConfigurations);
    }

    let report = diff(&outcome.configurations);
    let renderer = match (&cli.template, format) {
        (Some(path), OutputFormat::Text) => TemplateRenderer::from_file(path)?,
        _ => TemplateRenderer::default(),
    };

    // Opened last so a failed run leaves no empty report behind
    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    if !options.quiet {
        for line in &preamble {
            writeln!(out, "{}{}", options.prefix, line)?;
        }
    }

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
            out.flush()?;
        }
        OutputFormat::JsonLines => {
            for event in report.events() {
                out.write_all(JsonRenderer.render(event).as_bytes())?;
            }
            out.flush()?;
        }
        OutputFormat::Text => {
            ReportWriter::new(&renderer, options).write(&report, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Pair up `<file> <version>` arguments
fn parse_sources(inputs: &[String]) -> Result<Vec<ConfigSource>> {
    if inputs.len() % 2 != 0 {
        return Err(ConfDiffError::InvalidArguments(format!(
            "got an odd number of arguments ({})",
            inputs.len()
        )));
    }
    Ok(inputs
        .chunks(2)
        .map(|pair| ConfigSource::new(&pair[0], pair[1].clone()))
        .collect())
}
