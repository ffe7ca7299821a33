use anyhow::Result;
use clap::{Parser, Subcommand};
use logofetch::commands::{
    fetch_command, init_project_command, list_providers_command, missing_command,
    project_info_command, slug_command, sync_map_command, FetchArgs,
};
use logofetch::init_logging;

/// Brand logo resolver CLI.
///
/// This CLI is a thin wrapper around `logo-core` (exposed in code as `logo_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "logofetch",
    version,
    about = "Resolve, validate, and cache brand logos",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a logo project at the given root.
    ///
    /// Writes `.logofetch/config.json` with default settings and creates the
    /// output directory.
    Init {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show project configuration and asset counts.
    Info {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Resolve logos for catalog brands.
    ///
    /// By default only brands without a logo on disk are processed.
    Fetch {
        #[arg(long, default_value = ".")]
        root: String,

        /// Only brands whose name contains this text (case-insensitive).
        #[arg(long)]
        brand: Option<String>,

        /// Process every brand; cached logos are re-recorded without network calls.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Ignore cached logos and consult providers for every selected brand.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Maximum number of brands resolved at once (overrides config).
        #[arg(long)]
        concurrency: Option<usize>,

        /// Comma-separated provider order (overrides config).
        #[arg(long, value_delimiter = ',')]
        providers: Option<Vec<String>>,
    },

    /// List catalog brands without a logo on disk.
    Missing {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Record every logo already on disk in the logo map.
    SyncMap {
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// List available providers in configured order.
    Providers {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the slug and asset path a brand name maps to.
    Slug {
        name: String,

        #[arg(long, default_value = ".")]
        root: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Init { root, name } => init_project_command(&root, name)?,
        Command::Info { root, json } => project_info_command(&root, json)?,
        Command::Fetch { root, brand, all, force, concurrency, providers } => {
            let args = FetchArgs { brand, all, force, concurrency, providers };
            fetch_command(&root, &args)?;
        }
        Command::Missing { root, json } => missing_command(&root, json)?,
        Command::SyncMap { root } => {
            sync_map_command(&root)?;
        }
        Command::Providers { root, json } => list_providers_command(&root, json)?,
        Command::Slug { name, root } => slug_command(&root, &name)?,
    }

    Ok(())
}
