use anyhow::Result;
use clap::Parser;
use gemlazy::commands::{self, Config, GemArg, RequireOptions};
use std::path::PathBuf;

/// gemlazy - lazy gem activation
///
/// Activate installed gems and resolve their dependencies only when a load
/// request actually needs them.
///
/// Examples:
///   gemlazy list                          # List installed gems
///   gemlazy which b/c                     # Show the gems providing b/c
///   gemlazy require --activate a-1 b/c    # Activate a-1, then load b/c
#[derive(Parser, Debug)]
#[command(author, version = env!("GEMLAZY_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Install root directory (defaults to ~/.gemlazy; also via GEMLAZY_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "GEMLAZY_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub install_root: Option<PathBuf>,

    /// Directory searched after active gems (repeatable; also via GEMLAZY_LOAD_PATH)
    #[arg(long = "include", short = 'I', value_name = "DIR", global = true)]
    pub includes: Vec<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List installed gems
    List,

    /// Show the installed gems that provide a path
    Which(WhichArgs),

    /// Activate gems and load paths in one session
    Require(RequireArgs),
}

#[derive(clap::Args, Debug)]
pub struct WhichArgs {
    /// Path as passed to require, e.g. "b/c"
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct RequireArgs {
    /// Activate an installed gem by full name before loading, e.g. "a-1"
    #[arg(long = "activate", value_name = "NAME-VERSION")]
    pub activate: Vec<String>,

    /// Activate the best version meeting a requirement, e.g. "b:>= 1, < 3"
    #[arg(long = "gem", value_name = "NAME:REQ")]
    pub gems: Vec<GemArg>,

    /// Paths to load, in order
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = gemlazy::runtime::RealRuntime;
    let config = Config::new(runtime, cli.install_root, cli.includes)?;

    match cli.command {
        Commands::List => commands::list(&config)?,
        Commands::Which(args) => commands::which(&config, &args.path)?,
        Commands::Require(args) => {
            let options = RequireOptions {
                activate: args.activate,
                gems: args.gems,
                paths: args.paths,
            };
            commands::require(config, &options)?
        }
    }
    Ok(())
}
