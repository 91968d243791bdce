use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{stdin, stdout, AsyncWriteExt, BufReader};
use tracing::{debug, info, Level};

use tokenlog::codec::RawDecoder;
use tokenlog::protocol::Frame;
use tokenlog::stream::detokenize_lines;
use tokenlog::{Detokenizer, TokenTable, DEFAULT_RECURSION};

#[derive(Parser)]
#[command(name = "tokenlog")]
#[command(about = "Turn tokenized device logs back into readable text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Token database file (CSV, or JSON by .json extension); repeatable
    #[arg(short, long = "database", global = true)]
    databases: Vec<PathBuf>,

    /// Character marking Base64 tokens in text
    #[arg(long, global = true, default_value_t = '$')]
    prefix: char,

    /// Depth for rendering tokens nested in rendered messages
    #[arg(long, global = true, default_value_t = DEFAULT_RECURSION)]
    recursion: usize,

    /// Print format strings without rendering arguments
    #[arg(long, global = true)]
    raw_format: bool,

    /// Log unresolved tokens and other debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detokenize Base64 tokens in a text stream (stdin by default)
    Text {
        /// Read from this file instead of stdin
        file: Option<PathBuf>,
    },
    /// Detokenize hex-encoded binary frames, one output line each
    Frame {
        /// Frames as hex, e.g. 2a0000002a000000
        #[arg(required = true)]
        frames: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the detokenized output.
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let table = TokenTable::load_paths(&cli.databases).context("Failed to load token database")?;
    if table.is_empty() {
        info!("No token entries loaded; tokens will be left as written");
    }

    let mut builder = Detokenizer::builder()
        .database(table)
        .prefix(cli.prefix)
        .recursion(cli.recursion);
    if cli.raw_format {
        builder = builder.decoder(RawDecoder);
    }
    let detokenizer = builder.build();
    debug!("{:?}", detokenizer);

    match cli.command {
        Commands::Text { file } => {
            let lines = match file {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    detokenize_lines(&detokenizer, BufReader::new(file), stdout()).await?
                }
                None => detokenize_lines(&detokenizer, BufReader::new(stdin()), stdout()).await?,
            };
            debug!("Processed {} lines", lines);
        }
        Commands::Frame { frames } => {
            let mut out = stdout();
            for hex_frame in frames {
                let bytes = hex::decode(hex_frame.trim())
                    .with_context(|| format!("Invalid hex frame '{}'", hex_frame))?;
                let mut line = detokenizer.detokenize(&Frame::from(bytes));
                line.push('\n');
                out.write_all(line.as_bytes()).await?;
            }
            out.flush().await?;
        }
    }

    Ok(())
}
