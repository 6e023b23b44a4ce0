use clap::{Parser, Subcommand};
use latent_resolutions::commands::*;
use latent_resolutions::core::{print_error, GlobalOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "latent-resolutions")]
#[command(about = "Resolution catalog and empty latent generator for image pipelines")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to the config file (defaults to <config dir>/latent-resolutions/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing the resolution preset files
    #[arg(long, global = true, value_name = "DIR")]
    catalog_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the sorted resolution list with usage marks
    List {
        /// Only show one category (sdxl, sd15, custom)
        #[arg(long)]
        category: Option<String>,
        /// Print bare keys, one per line
        #[arg(long)]
        plain: bool,
    },
    /// Generate an empty latent for a resolution (falls back instead of failing)
    Generate {
        /// Resolution key, with or without usage marks (e.g. "1024 x 1024 (1.00)")
        resolution: String,
        /// Number of latents in the batch
        #[arg(short, long)]
        batch_size: Option<u32>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show catalog statistics and duplicate keys
    Stats {
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or remove a favorite resolution
    Favorite {
        #[command(subcommand)]
        action: FavoriteCommand,
    },
    /// Show usage statistics, recent and frequently used resolutions
    Usage {
        /// Drop recent entries older than this many days first
        #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(i64).range(0..))]
        cleanup_days: Option<i64>,
    },
}

#[derive(Subcommand)]
enum FavoriteCommand {
    /// Mark a resolution as favorite
    Add { resolution: String },
    /// Remove a resolution from favorites
    Remove { resolution: String },
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag; RUST_LOG still wins when set
    let level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = GlobalOptions {
        config_path: cli.config,
        catalog_dir: cli.catalog_dir,
    };

    let result = match cli.command {
        Commands::List { category, plain } => execute_list(&options, category.as_deref(), plain),
        Commands::Generate {
            resolution,
            batch_size,
            json,
        } => execute_generate(&options, &resolution, batch_size, json),
        Commands::Stats { json } => execute_stats(&options, json),
        Commands::Favorite { action } => match action {
            FavoriteCommand::Add { resolution } => {
                execute_favorite(&options, FavoriteAction::Add, &resolution)
            }
            FavoriteCommand::Remove { resolution } => {
                execute_favorite(&options, FavoriteAction::Remove, &resolution)
            }
        },
        Commands::Usage { cleanup_days } => execute_usage(&options, cleanup_days),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
