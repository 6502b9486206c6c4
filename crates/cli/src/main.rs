//! DevZero fleet provider CLI
//!
//! Drives the provider's resources from JSON documents: inspect schemas,
//! validate and plan configurations, and apply, read, import or destroy
//! resources through the fleet API.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{lifecycle, schema};
use provider_lib::observability::{init_tracing, LogFormat};
use provider_lib::{DevzeroProvider, ProviderError};
use std::path::PathBuf;
use std::process::ExitCode;

/// DevZero fleet provider CLI
#[derive(Parser)]
#[command(name = "dzctl")]
#[command(author, version, about = "CLI for the DevZero fleet provider", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub provider: config::ProviderArgs,

    /// Log format written to stderr (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resource types
    Resources {
        /// Output format
        #[arg(long, short, default_value = "table")]
        format: output::OutputFormat,
    },

    /// Show the attribute schema of a resource type
    Schema {
        /// Resource type, e.g. devzero_cluster, or "devzero" for the provider
        resource: String,

        /// Output format
        #[arg(long, short, default_value = "table")]
        format: output::OutputFormat,
    },

    /// Validate a configuration document
    Validate {
        /// Resource type
        resource: String,

        /// Configuration document
        #[arg(long, short)]
        config: PathBuf,
    },

    /// Show the planned change for a configuration
    Plan {
        /// Resource type
        resource: String,

        /// Configuration document
        #[arg(long, short)]
        config: PathBuf,

        /// Prior state document
        #[arg(long, short)]
        state: Option<PathBuf>,

        /// Output format
        #[arg(long, short, default_value = "table")]
        format: output::OutputFormat,
    },

    /// Create or update a resource and emit its new state
    Apply {
        /// Resource type
        resource: String,

        /// Configuration document
        #[arg(long, short)]
        config: PathBuf,

        /// Prior state document
        #[arg(long, short)]
        state: Option<PathBuf>,

        /// Write the new state here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Refresh a state document from the fleet API
    Read {
        /// Resource type
        resource: String,

        /// State document
        #[arg(long, short)]
        state: PathBuf,

        /// Write the refreshed state here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import an existing resource by id
    Import {
        /// Resource type
        resource: String,

        /// Remote identifier
        id: String,

        /// Write the imported state here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete the resource behind a state document
    Destroy {
        /// Resource type
        resource: String,

        /// State document
        #[arg(long, short)]
        state: PathBuf,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let provider = DevzeroProvider::new(env!("CARGO_PKG_VERSION"));
    let args = &cli.provider;

    match cli.command {
        Commands::Resources { format } => schema::list_resources(&provider, format)?,
        Commands::Schema { resource, format } => {
            schema::show_schema(&provider, &resource, format)?;
        }
        Commands::Validate { resource, config } => {
            lifecycle::validate(&provider, &resource, &config)?;
        }
        Commands::Plan {
            resource,
            config,
            state,
            format,
        } => {
            lifecycle::plan(&provider, &resource, &config, state.as_deref(), format)?;
        }
        Commands::Apply {
            resource,
            config,
            state,
            output,
        } => {
            lifecycle::apply(
                &provider,
                args,
                &resource,
                &config,
                state.as_deref(),
                output.as_deref(),
            )
            .await?;
        }
        Commands::Read {
            resource,
            state,
            output,
        } => {
            lifecycle::read(&provider, args, &resource, &state, output.as_deref()).await?;
        }
        Commands::Import {
            resource,
            id,
            output,
        } => {
            lifecycle::import(&provider, args, &resource, &id, output.as_deref()).await?;
        }
        Commands::Destroy { resource, state } => {
            lifecycle::destroy(&provider, args, &resource, &state).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ProviderError>() {
                Some(provider_err) => output::print_diagnostics(&provider_err.to_diagnostics()),
                None => output::print_error(&format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    }
}
