//! partbin CLI
//!
//! Command-line interface for partbin - electronic component inventory
//! with GitHub-backed sync.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use partbin_core::{
    Config, CredentialStore, GitHubClient, KeyValueStore, LocalStore, Store, SyncCoordinator,
};

mod commands;
mod logging;
mod output;
mod prompt;

use commands::component::Fields;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "partbin")]
#[command(about = "partbin - Electronic component inventory with GitHub sync")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List components
    #[command(alias = "ls")]
    List {
        /// Only components whose name, category, part number or parameters contain this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only components with low stock
        #[arg(short, long)]
        low_stock: bool,
    },
    /// Show component details
    Show {
        /// Component ID (full UUID or prefix)
        id: String,
    },
    /// Add a component
    #[command(alias = "create")]
    Add {
        /// Part designation
        #[arg(long)]
        name: String,
        /// Vendor or distributor SKU
        #[arg(long)]
        part_number: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit a component
    Edit {
        /// Component ID (full UUID or prefix)
        id: String,
        /// New part designation
        #[arg(long)]
        name: Option<String>,
        /// New part number
        #[arg(long)]
        part_number: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a component
    #[command(alias = "rm")]
    Delete {
        /// Component ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Push local data to the GitHub repository
    Sync,
    /// Replace local data with the GitHub copy, discarding unpushed changes
    Pull {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show status (counts, sync configuration)
    Status,
    /// Manage GitHub credentials
    Auth {
        #[command(subcommand)]
        command: Option<AuthCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Optional component fields shared by `add` and `edit`
#[derive(Args, Debug, Default)]
struct FieldArgs {
    /// Free-text classification
    #[arg(long)]
    category: Option<String>,
    /// Storage bin
    #[arg(long)]
    location: Option<String>,
    /// Footprint code, e.g. SOT-223
    #[arg(long)]
    package: Option<String>,
    /// Electrical specification
    #[arg(long)]
    parameters: Option<String>,
    /// Quantity on hand
    #[arg(long)]
    stock: Option<u32>,
    /// Datasheet URL (empty string clears it)
    #[arg(long)]
    datasheet: Option<String>,
}

impl FieldArgs {
    fn into_fields(self, name: Option<String>, part_number: Option<String>) -> Fields {
        Fields {
            name,
            part_number,
            category: self.category,
            location: self.location,
            package: self.package,
            parameters: self.parameters,
            stock: self.stock,
            datasheet: self.datasheet,
        }
    }
}

#[derive(Subcommand, Clone)]
enum AuthCommands {
    /// Store a GitHub token and repository
    Set {
        /// Personal access token with contents permission
        token: String,
        /// Repository as owner/name
        repository: String,
    },
    /// Remove stored credentials
    Clear,
    /// Show credentials (token masked)
    Show,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, document_path, request_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file directly
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config);

    // Auth commands don't need the store
    if let Commands::Auth { command } = &cli.command {
        return handle_auth_command(command.clone(), &config, &output);
    }

    let kv = KeyValueStore::new(&config.data_dir);
    let credentials = CredentialStore::new(kv.clone()).get_with_env();
    let remote = GitHubClient::new(&config.api_url, &credentials, config.request_timeout())
        .context("Failed to create GitHub client")?;
    let sync = SyncCoordinator::new(
        credentials,
        remote,
        LocalStore::new(kv),
        config.sync_settings(),
    );
    let mut store = Store::open(&sync).await;

    match cli.command {
        Commands::List { search, low_stock } => {
            commands::component::list(&store, search, low_stock, &output)
        }
        Commands::Show { id } => commands::component::show(&store, id, &output),
        Commands::Add {
            name,
            part_number,
            fields,
        } => commands::component::add(
            &mut store,
            name,
            part_number,
            fields.into_fields(None, None),
            &output,
        ),
        Commands::Edit {
            id,
            name,
            part_number,
            fields,
        } => commands::component::edit(
            &mut store,
            id,
            fields.into_fields(name, part_number),
            &output,
        ),
        Commands::Delete { id, yes } => commands::component::delete(&mut store, id, yes, &output),
        Commands::Sync => commands::sync::sync(&store, &sync, &output).await,
        Commands::Pull { yes } => commands::sync::pull(&mut store, &sync, yes, &output).await,
        Commands::Status => commands::status::show(&store, &sync, &config, &output),
        Commands::Auth { .. } => unreachable!(),   // Handled above
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

fn handle_auth_command(
    command: Option<AuthCommands>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        Some(AuthCommands::Show) | None => commands::auth::show(config, output),
        Some(AuthCommands::Set { token, repository }) => {
            commands::auth::set(config, token, repository, output)
        }
        Some(AuthCommands::Clear) => commands::auth::clear(config, output),
    }
}
