use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use emergence_metrics::{ConversationAnalyzer, MetricsProfile};
use emergence_transcript::read_transcript;
use std::io::{self, Read};
use std::path::PathBuf;

mod batch;
mod output;
mod report;
mod tables;

use batch::{run_batch, BatchOptions};
use output::{print_stdout, to_json, AnalysisDocument};

#[derive(Parser)]
#[command(name = "emergence")]
#[command(about = "Heuristic emergence scoring for chat transcripts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scoring profile (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single conversation
    Analyze(AnalyzeArgs),

    /// Score every transcript in a directory
    Batch(BatchArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Transcript file (.txt, .json or .docx), or `-` for plain text on stdin
    input: String,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Print a markdown report instead of JSON
    #[arg(long, conflicts_with = "pretty")]
    report: bool,

    /// Print the per-turn metrics table as CSV instead of JSON
    #[arg(long, conflicts_with_all = ["pretty", "report"])]
    csv: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory containing transcripts
    input_dir: PathBuf,

    /// Directory for per-conversation results and reports
    #[arg(short, long)]
    output: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Worker threads (defaults to one per core)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Indent the per-conversation JSON files
    #[arg(long)]
    pretty: bool,

    /// Also write CSV tables (metrics, summary, bins, checks, top turns)
    #[arg(long)]
    csv: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Analyze(args) => !args.report,
        Commands::Batch(_) => true,
    };
    if json_output && !cli.verbose {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let analyzer = load_analyzer(cli.config.as_ref())?;

    match cli.command {
        Commands::Analyze(args) => run_analyze(&analyzer, args)?,
        Commands::Batch(args) => run_batch_command(&analyzer, args)?,
    }

    Ok(())
}

fn load_analyzer(config: Option<&PathBuf>) -> Result<ConversationAnalyzer> {
    let profile = match config {
        Some(path) => {
            let profile = MetricsProfile::load(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))?;
            log::info!("Loaded scoring profile {}", path.display());
            profile
        }
        None => MetricsProfile::default(),
    };
    ConversationAnalyzer::new(&profile).context("Invalid scoring profile")
}

fn run_analyze(analyzer: &ConversationAnalyzer, args: AnalyzeArgs) -> Result<()> {
    let (source, text) = if args.input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read transcript from stdin")?;
        ("<stdin>".to_string(), text)
    } else {
        let text = read_transcript(&args.input)
            .with_context(|| format!("Failed to read transcript {}", args.input))?;
        (args.input.clone(), text)
    };

    let doc = AnalysisDocument::build(analyzer, source, &text);
    log::info!(
        "{}: {} turns ({} strategy), {} hot",
        doc.source,
        doc.summary.rows,
        doc.analysis.strategy.as_str(),
        doc.analysis.hot_turns()
    );

    if args.report {
        print_stdout(&report::render_conversation_report(&doc))
    } else if args.csv {
        let mut table = Vec::new();
        tables::write_metrics_csv(&mut table, &doc)?;
        print_stdout(String::from_utf8_lossy(&table).trim_end())
    } else {
        print_stdout(&to_json(&doc, args.pretty)?)
    }
}

fn run_batch_command(analyzer: &ConversationAnalyzer, args: BatchArgs) -> Result<()> {
    let options = BatchOptions {
        input_dir: args.input_dir,
        output_dir: args.output,
        recursive: args.recursive,
        jobs: args.jobs.map(usize::from),
        pretty: args.pretty,
        csv: args.csv,
    };
    let summary = run_batch(analyzer, &options)?;
    print_stdout(&to_json(&summary, true)?)
}
