use anyhow::Result;
use bazaar_core::{
    access::GrantFlags,
    tracing::{config::InstrumentationConfig, init::init_tracing},
};
use bazaar_daemon::{Settings, commands, serve};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Bazaar permission gate daemon
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a signed bearer token
    IssueToken {
        #[arg(long)]
        sub: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Create or replace a grant in the configured database
    SetPermission {
        #[arg(long)]
        role: String,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        view: bool,
        #[arg(long)]
        edit: bool,
        #[arg(long)]
        delete: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let instrumentation_config = InstrumentationConfig {
        service_name: "bazaard".to_string(),
        service_version: env!("CARGO_PKG_VERSION").to_string(),
        ..InstrumentationConfig::from_env()
    };
    init_tracing(&instrumentation_config)?;

    if let Some(path) = &cli.config {
        info!("Loading configuration from: {}", path.display());
    }
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await?,
        Command::IssueToken { sub, role, name } => {
            let token = commands::issue_token(&settings, &sub, role.as_deref(), name.as_deref())?;
            println!("{token}");
        }
        Command::SetPermission {
            role,
            resource,
            view,
            edit,
            delete,
        } => {
            let grant = commands::set_permission(
                &settings,
                &role,
                &resource,
                GrantFlags::new(view, edit, delete),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&grant)?);
        }
    }

    Ok(())
}
