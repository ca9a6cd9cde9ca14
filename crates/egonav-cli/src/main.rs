#![forbid(unsafe_code)]

mod cmd;
mod layout;
mod output;
mod tui;

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "egonav: explore knowledge graphs one neighborhood at a time",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (defaults to ./egonav.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Summarize a dataset",
        long_about = "Print node and edge counts, the content hash, and the entity type, relation type and community inventories.",
        after_help = "EXAMPLES:\n    egonav stats graph.json\n\n    # Machine-readable\n    egonav stats graph.json --format json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Show one node and its connections",
        long_about = "Show a node's details and its connections grouped by neighbor, labelled from the node's point of view.",
        after_help = "EXAMPLES:\n    egonav show graph.json acme\n\n    # Only GOVERNS connections\n    egonav show graph.json data-act --relation GOVERNS"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List a node's neighbors by degree",
        after_help = "EXAMPLES:\n    egonav neighbors graph.json acme --limit 10"
    )]
    Neighbors(cmd::neighbors::NeighborsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Compute community regions",
        long_about = "Compute each community's centroid and padded hull over the deterministic seeded layout."
    )]
    Regions(cmd::regions::RegionsArgs),

    #[command(
        next_help_heading = "Explore",
        about = "Open the interactive explorer",
        after_help = "EXAMPLES:\n    egonav explore graph.json\n\n    # Keep a debug log while exploring\n    EGONAV_LOG=egonav=debug egonav explore graph.json --log-file explore.log"
    )]
    Explore(cmd::explore::ExploreArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    egonav completions bash\n\n    # Generate zsh completions\n    egonav completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Log lines held back while the explorer owns the terminal.
#[derive(Clone, Default)]
struct DeferredLog(Arc<Mutex<Vec<u8>>>);

impl DeferredLog {
    fn flush_to_stderr(&self) -> io::Result<()> {
        let buf = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?;
        io::stderr().write_all(&buf)
    }
}

impl Write for DeferredLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where log output goes.
enum LogSink {
    Stderr,
    File(File),
    /// Warnings only, replayed to stderr after the terminal is restored.
    Deferred(DeferredLog),
}

fn init_tracing(sink: LogSink, verbose: bool) {
    let fallback = if env::var("DEBUG").is_ok() || verbose {
        "egonav=debug,info"
    } else {
        "egonav=info,warn"
    };
    let (writer, fallback, ansi) = match sink {
        LogSink::Stderr => (BoxMakeWriter::new(io::stderr), fallback, true),
        LogSink::File(file) => (BoxMakeWriter::new(Mutex::new(file)), fallback, false),
        LogSink::Deferred(log) => (BoxMakeWriter::new(move || log.clone()), "warn", false),
    };
    let filter = EnvFilter::try_from_env("EGONAV_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    let format = env::var("EGONAV_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut deferred = None;
    let sink = match &cli.command {
        Commands::Explore(args) => match &args.log_file {
            Some(path) => LogSink::File(
                File::create(path)
                    .with_context(|| format!("failed to create log file {}", path.display()))?,
            ),
            None => {
                let log = DeferredLog::default();
                deferred = Some(log.clone());
                LogSink::Deferred(log)
            }
        },
        _ => LogSink::Stderr,
    };
    init_tracing(sink, cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = output::resolve_output_mode(cli.format, cli.json);
    let config = cli.config.as_deref();

    let result = match &cli.command {
        Commands::Stats(args) => cmd::stats::run_stats(args, config, output),
        Commands::Show(args) => cmd::show::run_show(args, config, output),
        Commands::Neighbors(args) => cmd::neighbors::run_neighbors(args, config, output),
        Commands::Regions(args) => cmd::regions::run_regions(args, config, output),
        Commands::Explore(args) => cmd::explore::run_explore(args, config, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if let Some(log) = deferred {
        log.flush_to_stderr()?;
    }
    result
}
