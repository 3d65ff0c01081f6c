//! CLI frontend for the visual-novel runtime.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vn",
    about = "vn - a terminal player for branching visual novels",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stories in a content directory
    List {
        /// Directory containing library.json and story documents
        #[arg(short, long, default_value = "novels")]
        dir: PathBuf,
    },

    /// Validate story content without playing it
    Check {
        /// Story id to check (default: every story in the library)
        id: Option<String>,

        /// Directory containing library.json and story documents
        #[arg(short, long, default_value = "novels")]
        dir: PathBuf,
    },

    /// Play a story in the terminal
    Play {
        /// Story id from the library
        id: String,

        /// Directory containing library.json and story documents
        #[arg(short, long, default_value = "novels")]
        dir: PathBuf,

        /// Directory for progress and relationship saves
        #[arg(long, default_value = ".vn-save")]
        save_dir: PathBuf,

        /// Skip reveal pacing and print everything immediately
        #[arg(long)]
        fast: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { dir } => commands::list::run(&dir),
        Commands::Check { id, dir } => commands::check::run(&dir, id.as_deref()),
        Commands::Play {
            id,
            dir,
            save_dir,
            fast,
        } => commands::play::run(&dir, &id, &save_dir, fast),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
