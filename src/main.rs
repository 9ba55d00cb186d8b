//! CLI for citenum - Convert cite tags in Markdown documents to numbered references.

use std::fmt;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use citenum::{discover_documents, load_bibliography, rewrite_document, Bibliography, Config};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Convert {% cite %} tags in Markdown documents to numbered references
#[derive(Parser)]
#[command(name = "citenum")]
#[command(version)]
#[command(after_help = "\
Examples:
  citenum convert
  citenum convert guide.md notes.md --bib refs.bib
  citenum convert guide.md --dry-run
  citenum parse --bib refs.bib")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite Markdown files in place with numbered citations
    #[command(after_help = "\
Without FILES, the candidate document list from the configuration is used;
candidates that do not exist are skipped.

Citation syntax: {% cite key %}, {% cite key1 key2 %}")]
    Convert {
        /// Markdown files to convert
        files: Vec<PathBuf>,

        /// BibTeX file (default: _bibliography/references.bib)
        #[arg(short, long)]
        bib: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bibliography section heading (default: "## Bibliography")
        #[arg(long)]
        heading: Option<String>,

        /// Print rewritten documents to stdout instead of writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the parsed bibliography as JSON
    Parse {
        /// BibTeX file (default: _bibliography/references.bib)
        #[arg(short, long)]
        bib: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// AppError - semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 11 - bibliography file not found / unreadable
    BibFile(String),
    /// Exit 12 - configuration file not found / invalid
    Config(String),
    /// Exit 15 - cannot write to stdout
    Output(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::BibFile(_) => 11,
            AppError::Config(_) => 12,
            AppError::Output(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BibFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: pass the BibTeX file with --bib, or run from the site root",
                    msg
                )
            }
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: the configuration must be a JSON object with keys such as \
                     \"bibliography\", \"documents\", \"heading\" or \"fallback\"",
                    msg
                )
            }
            AppError::Output(msg) => write!(f, "{}", msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Convert {
            files,
            bib,
            config,
            heading,
            dry_run,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(bib) = bib {
                config.bibliography = bib;
            }
            if let Some(heading) = heading {
                config.heading = heading;
            }
            convert_command(&files, &config, dry_run)?;
        }
        Commands::Parse { bib, config } => {
            let config = load_config(config.as_deref())?;
            let bib_path = bib.unwrap_or(config.bibliography);
            parse_command(&bib_path)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Convert citation tags in each document and write it back in place.
fn convert_command(files: &[PathBuf], config: &Config, dry_run: bool) -> Result<(), AppError> {
    let bibliography = read_bibliography(&config.bibliography)?;
    eprintln!(
        "found {} reference(s) in {}",
        bibliography.len(),
        config.bibliography.display()
    );

    let documents = if files.is_empty() {
        discover_documents(&config.documents)
    } else {
        let (present, missing): (Vec<PathBuf>, Vec<PathBuf>) =
            files.iter().cloned().partition(|path| path.is_file());
        for path in missing {
            warn!(file = %path.display(), "file not found, skipping");
        }
        discover_documents(&present)
    };

    let mut total = 0;
    for path in &documents {
        eprintln!("processing {}...", path.display());

        let markdown = match fs::read_to_string(path) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "cannot read file, skipping");
                continue;
            }
        };

        let result = rewrite_document(&markdown, &bibliography, config);

        if dry_run {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", result.content)
                .map_err(|e| AppError::Output(format!("stdout: {}", e)))?;
        } else if let Err(e) = fs::write(path, &result.content) {
            warn!(file = %path.display(), error = %e, "cannot write file, skipping");
            continue;
        }

        eprintln!(
            "converted {} citation(s) in {}",
            result.resolved,
            path.display()
        );
        total += result.resolved;
    }

    eprintln!(
        "processing complete: {} citation(s) across {} file(s)",
        total,
        documents.len()
    );

    Ok(())
}

/// Print the parsed bibliography as pretty JSON, sorted by key.
fn parse_command(bib: &Path) -> Result<(), AppError> {
    let bibliography = read_bibliography(bib)?;
    let json = serde_json::to_string_pretty(&bibliography)
        .map_err(|e| AppError::Output(format!("cannot serialize bibliography: {}", e)))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).map_err(|e| AppError::Output(format!("stdout: {}", e)))?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    match path {
        Some(path) => Config::load(path)
            .map_err(|e| AppError::Config(format!("'{}': {}", path.display(), e))),
        None => Ok(Config::default()),
    }
}

fn read_bibliography(path: &Path) -> Result<Bibliography, AppError> {
    load_bibliography(path).map_err(|e| AppError::BibFile(format!("'{}': {}", path.display(), e)))
}
