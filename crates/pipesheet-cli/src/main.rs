//! Reads a pipe-delimited document, evaluates it, and writes the rendered
//! grid to a file or standard output.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pipesheet::{Engine, parse_document, render_grid};

#[derive(Debug, thiserror::Error)]
enum IoError {
    #[error("input file `{path}` does not exist")]
    InputMissing { path: PathBuf },
    #[error("output file `{path}` already exists")]
    OutputExists { path: PathBuf },
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "pipesheet",
    version,
    about = "Evaluate a pipe-delimited spreadsheet document"
)]
struct Cli {
    /// Input document.
    input: PathBuf,

    /// Destination file; must not exist yet. Omitted, the rendered grid
    /// goes to standard output.
    output: Option<PathBuf>,

    /// Log level directive (also settable via PIPESHEET_LOG).
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    run(cli)
}

fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.parse().context("invalid log level")?)
                .with_env_var("PIPESHEET_LOG")
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    if !cli.input.exists() {
        return Err(IoError::InputMissing { path: cli.input }.into());
    }
    if let Some(ref output) = cli.output {
        if output.exists() {
            return Err(IoError::OutputExists {
                path: output.clone(),
            }
            .into());
        }
    }

    let started = Instant::now();
    let text = fs::read_to_string(&cli.input).map_err(|source| IoError::Read {
        path: cli.input.clone(),
        source,
    })?;
    debug!(bytes = text.len(), "read input");

    let grid = parse_document(&text)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;
    debug!(rows = grid.len(), elapsed = ?started.elapsed(), "parsed document");

    let values = Engine::default()
        .evaluate(&grid)
        .with_context(|| format!("failed to evaluate {}", cli.input.display()))?;
    debug!(elapsed = ?started.elapsed(), "evaluated grid");

    let rendered = render_grid(&values);
    match cli.output {
        Some(path) => {
            fs::write(&path, rendered).map_err(|source| IoError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), elapsed = ?started.elapsed(), "wrote output");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .and_then(|()| handle.flush())
                .map_err(|source| IoError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }
    Ok(())
}
