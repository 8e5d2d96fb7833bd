use anyhow::Result;
use cdi_protocol::{serialize_json_pretty, ErrorEnvelope};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod commands;
mod config;
mod summary;

pub use config::{CORPUS_ROOT_ENV, OUTPUT_DIR_ENV};

#[derive(Parser)]
#[command(name = "cdi")]
#[command(about = "Normalize chart evaluations, build reports and index CPT codes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a reverse index from CPT codes to payer procedure records
    #[command(name = "cpt-index")]
    CptIndex(CptIndexArgs),

    /// Normalize an engine result into the display response contract
    Normalize(NormalizeArgs),

    /// Write the evaluation workbook for a batch of charts
    Report(ReportArgs),
}

#[derive(Args)]
struct CptIndexArgs {
    /// Target CPT codes (repeatable, comma-separated)
    #[arg(long = "codes", value_name = "CODES")]
    codes: Vec<String>,

    /// File with one or more codes per line (`#` comments allowed)
    #[arg(long)]
    codes_file: Option<PathBuf>,

    /// Corpus root holding the procedure shards (overrides CDI_CORPUS_ROOT)
    #[arg(long)]
    corpus_root: Option<PathBuf>,

    /// Output TSV path (default: timestamped name in CDI_OUTPUT_DIR)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NormalizeArgs {
    /// Engine result JSON document
    #[arg(short, long)]
    input: PathBuf,

    /// Display name (default: input file stem)
    #[arg(long)]
    display_name: Option<String>,
}

#[derive(Args)]
struct ReportArgs {
    /// JSON array of per-chart evaluation records
    #[arg(long)]
    records: PathBuf,

    /// JSON object of aggregate metrics
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Output workbook path (default: timestamped name in CDI_OUTPUT_DIR)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Process exit status for a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done,
    NoCodes,
    NoShards,
}

impl Outcome {
    pub(crate) const fn exit_code(self) -> i32 {
        match self {
            Outcome::Done => 0,
            Outcome::NoCodes => 2,
            Outcome::NoShards => 3,
        }
    }
}

pub(crate) fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    if let Commands::CptIndex(args) = &cli.command {
        if args.json {
            cli.quiet = true;
        }
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let result = match cli.command {
        Commands::CptIndex(args) => commands::cpt_index::run(
            args.codes,
            args.codes_file,
            config::corpus_root(args.corpus_root),
            args.output,
            args.json,
        ),
        Commands::Normalize(args) => commands::normalize::run(&args.input, args.display_name),
        Commands::Report(args) => {
            commands::report::run(&args.records, args.metrics.as_deref(), args.output)
        }
    };

    match result {
        Ok(Outcome::Done) => Ok(()),
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(err) => {
            log::error!("{err:#}");
            let envelope = ErrorEnvelope::new("internal", format!("{err:#}"));
            print_stdout(&serialize_json_pretty(&envelope)?)?;
            std::process::exit(1);
        }
    }
}
