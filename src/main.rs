use std::path::PathBuf;

use clap::{Parser, Subcommand};
use place_keywords::Result;
use place_keywords::commands::{
    ExtractOptions, default_snapshot_path, extract, extract_snapshot, suggest,
};
use place_keywords::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "place-keywords")]
#[command(about = "Extract diverse keywords from a place's reviews")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct ExtractArgs {
    /// Keyword to always report, may be repeated. Replaces the configured list
    #[arg(long = "custom", value_name = "KEYWORD")]
    custom: Vec<String>,
    /// Number of keywords to select
    #[arg(long)]
    top_n: Option<usize>,
    /// Trade relevance for variety, between 0 and 1
    #[arg(long)]
    diversity: Option<f32>,
    /// Maximum number of review pages to fetch
    #[arg(long)]
    page_cap: Option<u32>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl From<ExtractArgs> for ExtractOptions {
    fn from(args: ExtractArgs) -> Self {
        Self {
            custom_keywords: args.custom,
            top_n: args.top_n,
            diversity: args.diversity,
            page_cap: args.page_cap,
            json: args.json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Configure API keys, Ollama connection and extraction defaults
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Fetch a place's reviews and extract keywords from them
    Extract {
        /// Place to look up, e.g. "Katz's Delicatessen New York"
        query: String,
        #[command(flatten)]
        args: ExtractArgs,
        /// Save the collected reviews. Without a path they go to the config directory
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        save: Option<Option<PathBuf>>,
    },
    /// Extract keywords from reviews saved with `extract --save`
    Snapshot {
        /// Saved reviews file
        path: PathBuf,
        #[command(flatten)]
        args: ExtractArgs,
    },
    /// List a place's keywords closest to a term
    Suggest {
        /// Place to look up
        query: String,
        /// Term to compare keywords against
        term: String,
        /// Use saved reviews instead of fetching
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Extract { query, args, save } => {
            let save = match save {
                Some(Some(path)) => Some(path),
                Some(None) => Some(default_snapshot_path(&query)?),
                None => None,
            };
            extract(&query, &args.into(), save.as_deref())?;
        }
        Commands::Snapshot { path, args } => {
            extract_snapshot(&path, &args.into())?;
        }
        Commands::Suggest {
            query,
            term,
            snapshot,
            json,
        } => {
            suggest(&query, &term, snapshot.as_deref(), json)?;
        }
    }

    Ok(())
}
