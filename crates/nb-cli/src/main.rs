//! nbtool: create, check, format and inspect notebook files

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nb_codec::{CodecOptions, NotebookCodec};
use nb_core::SessionConfig;
use nb_model::{Cell, CellType, NotebookDocument};
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "nbtool", about = "Notebook maintenance tool", version)]
struct Cli {
    /// Session config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new notebook with one empty code cell
    New {
        /// Output file
        path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Decode a notebook and report what was recovered
    Check {
        /// Notebook file
        path: PathBuf,
        /// Fail on any malformed cell or output instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Rewrite a notebook in canonical form
    Fmt {
        /// Notebook file
        path: PathBuf,
        /// Only report whether the file is already canonical
        #[arg(long)]
        check: bool,
        /// Rewrite even if malformed cells or outputs would be dropped
        #[arg(long)]
        force: bool,
    },
    /// Print a one-line summary per cell
    Show {
        /// Notebook file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Command::New { path, force } => new_notebook(&path, force, config.codec),
        Command::Check { path, strict } => {
            let options = if strict {
                CodecOptions::strict().with_indent(config.codec.indent)
            } else {
                config.codec
            };
            check(&path, options)
        }
        Command::Fmt { path, check, force } => format(&path, check, force, config.codec),
        Command::Show { path } => show(&path, config.codec),
    }
}

fn new_notebook(path: &Path, force: bool, options: CodecOptions) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    NotebookCodec::with_options(options)
        .write(path, &NotebookDocument::with_starter_cell())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

fn check(path: &Path, options: CodecOptions) -> Result<()> {
    let decoded = NotebookCodec::with_options(options)
        .read(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let doc = &decoded.document;

    println!(
        "{}: nbformat {}, {} cells ({} code, {} markdown, {} raw)",
        path.display(),
        doc.format(),
        doc.len(),
        count_of(doc, CellType::Code),
        count_of(doc, CellType::Markdown),
        count_of(doc, CellType::Raw),
    );
    for skipped in &decoded.report.skipped_cells {
        println!("  skipped cell {}: {}", skipped.path, skipped.reason);
    }
    for skipped in &decoded.report.skipped_outputs {
        println!("  dropped output {}: {}", skipped.path, skipped.reason);
    }
    Ok(())
}

fn format(path: &Path, check_only: bool, force: bool, options: CodecOptions) -> Result<()> {
    let codec = NotebookCodec::with_options(options);
    let original =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let decoded = codec
        .decode(&original)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let lossy = !decoded.report.is_clean();
    let canonical = codec.encode(&decoded.document)?;

    if canonical == original {
        println!("{} is canonical", path.display());
        return Ok(());
    }
    if check_only {
        bail!("{} is not in canonical form", path.display());
    }
    if lossy {
        let recovered = decoded.report.recovered_count();
        if !force {
            bail!(
                "{} has {recovered} malformed cells or outputs that formatting would drop (use --force to rewrite anyway)",
                path.display()
            );
        }
        tracing::warn!(recovered, "Formatting drops malformed elements");
    }
    std::fs::write(path, canonical).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Formatted {}", path.display());
    Ok(())
}

fn show(path: &Path, options: CodecOptions) -> Result<()> {
    let decoded = NotebookCodec::with_options(options)
        .read(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    for (index, cell) in decoded.document.cells().iter().enumerate() {
        println!("{}", describe_cell(index, cell));
    }
    Ok(())
}

fn count_of(doc: &NotebookDocument, cell_type: CellType) -> usize {
    doc.cells()
        .iter()
        .filter(|c| c.cell_type() == cell_type)
        .count()
}

/// `[index] type In [n]: first line -> output kinds`
fn describe_cell(index: usize, cell: &Cell) -> String {
    let text = cell.text();
    let first_line = text.lines().next().unwrap_or_default();
    let mut line = format!("[{index}] {:<8}", cell.cell_type().as_str());
    if cell.cell_type() == CellType::Code {
        match cell.execution_count() {
            Some(n) => {
                let _ = write!(line, " In [{n}]");
            }
            None => line.push_str(" In [ ]"),
        }
    }
    let _ = write!(line, ": {first_line}");
    if !cell.outputs().is_empty() {
        let kinds: Vec<&str> = cell.outputs().iter().map(|o| o.kind().as_str()).collect();
        let _ = write!(line, " -> {}", kinds.join(", "));
    }
    line
}
