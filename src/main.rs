//! `docshift` CLI - convert office documents to Markdown and editor blocks

mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use docshift::Config;

#[derive(Parser)]
#[command(name = "docshift")]
#[command(about = "Convert DOCX, XLSX and PDF documents to Markdown and editor blocks")]
#[command(version)]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/docshift/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for `convert`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown text
    #[default]
    Markdown,
    /// JSON object with the Markdown and conversion metadata
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document (URL or path) to Markdown
    Convert {
        /// http(s) URL, file:// URL or local path
        source: String,

        /// Display name used for routing and the unsupported stub
        #[arg(long)]
        name: Option<String>,

        /// Declared type (MIME or extension); overrides the name's extension
        #[arg(long = "type")]
        file_type: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },

    /// Render a DOCX document as an HTML fragment
    Html {
        /// http(s) URL, file:// URL or local path
        source: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave images out instead of inlining them as data URIs
        #[arg(long)]
        no_images: bool,
    },

    /// Project Markdown into editor blocks (JSON)
    Blocks {
        /// Markdown file, or `-` / nothing for stdin
        input: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Convert a document and project the Markdown into editor blocks
    Import {
        /// http(s) URL, file:// URL or local path
        source: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type")]
        file_type: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert several documents concurrently, one JSON line per source
    Batch {
        /// Sources to convert
        #[arg(required = true)]
        sources: Vec<String>,

        /// Maximum conversions in flight
        #[arg(short, long, default_value = "4")]
        parallel: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("docshift=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };

    match cli.command {
        Commands::Convert {
            source,
            name,
            file_type,
            output,
            format,
        } => {
            cmd::convert::cmd_convert(
                &config,
                &source,
                name.as_deref(),
                file_type.as_deref(),
                output,
                format,
            )
            .await?;
        }
        Commands::Html {
            source,
            output,
            no_images,
        } => {
            cmd::html::cmd_html(&config, &source, output, no_images).await?;
        }
        Commands::Blocks {
            input,
            output,
            compact,
        } => {
            cmd::blocks::cmd_blocks(input.as_deref(), output, compact)?;
        }
        Commands::Import {
            source,
            name,
            file_type,
            output,
        } => {
            cmd::import::cmd_import(&config, &source, name.as_deref(), file_type.as_deref(), output)
                .await?;
        }
        Commands::Batch { sources, parallel } => {
            cmd::batch::cmd_batch(&config, sources, parallel).await?;
        }
    }

    Ok(())
}
