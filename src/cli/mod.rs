pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "workforce-api")]
#[command(about = "Employee and task management REST backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Interface to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "SQLite URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create the schema and exit")]
    Migrate {
        #[arg(long, help = "Also load demo data into an empty database")]
        seed: bool,
    },
}

impl Cli {
    /// Environment-derived config with command-line overrides on top
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::from_env();
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        config
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();
    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate { seed } => commands::migrate::handle(config, seed).await,
    }
}
