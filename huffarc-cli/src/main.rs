//! HuffArc CLI - static Huffman archiver with incremental updates
//!
//! Compresses files and directories into a `.harc` archive, recompressing
//! only what changed since the last run.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_compress, cmd_decompress, cmd_info, cmd_list, cmd_test};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huffarc")]
#[command(author, version, about = "Static Huffman archiver with incremental updates")]
#[command(long_about = "
HuffArc compresses files with a per-file Huffman code and keeps archives up
to date incrementally: re-running compress only recompresses files whose
contents changed.

Examples:
  huffarc compress notes.txt
  huffarc compress src docs README.md
  huffarc compress 'logs/*.log' -a logs.harc
  huffarc decompress notes.harc -o restored
  huffarc decompress project.harc main README -o out
  huffarc info project.harc
  huffarc test project.harc
  huffarc list project.harc --json
")]
struct Cli {
    /// Log archive decisions to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files and directories into an archive
    #[command(alias = "c")]
    Compress {
        /// Files, directories or glob patterns to compress (`*` in a
        /// pattern also matches files in subdirectories)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Archive to create or update (named after the input if omitted)
        #[arg(short, long)]
        archive: Option<PathBuf>,
    },

    /// Decompress files from an archive
    #[command(alias = "x")]
    Decompress {
        /// Archive file to decompress
        archive: PathBuf,

        /// Entries to decompress, by full name, file name or stem (all if empty)
        files: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Show compression percentage of every entry
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Check archive integrity
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,
    },

    /// List entries of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Compress { paths, archive } => cmd_compress(&paths, archive.as_deref()),
        Commands::Decompress {
            archive,
            files,
            output,
        } => cmd_decompress(&archive, &files, &output),
        Commands::Info { archive, json } => cmd_info(&archive, json),
        Commands::Test { archive } => cmd_test(&archive),
        Commands::List { archive, json } => cmd_list(&archive, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
