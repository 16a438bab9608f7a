//! `boutique`: terminal driver for the boutique session engine.
//!
//! Signs in against the REST API, keeps the session in a local redb file,
//! and answers what a given path would render for that session.

mod commands;
mod config;

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing::debug;

use config::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "boutique", about = "Boutique session client")]
struct Cli {
    /// Path to client config file (default: ~/.boutique/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// REST API base URL (overrides config file and BOUTIQUE_API_URL).
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,

    /// Print JSON instead of text where supported.
    #[arg(long = "json", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session.
    Logout,

    /// Verify the stored session and show who is signed in.
    Whoami,

    /// Show what a path renders for the stored session.
    Route { path: String },

    /// Evaluate permissions for the stored session.
    Can {
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Show the theme preferences; `--toggle` flips light/dark.
    Theme {
        #[arg(long)]
        toggle: bool,
    },

    /// Write settings to the config file.
    Config {
        #[arg(long = "set-api-url")]
        set_api_url: Option<String>,
        #[arg(long = "set-store")]
        set_store: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);
    let mut client_config = ClientConfig::load(&config_path)?;

    if let Commands::Config {
        set_api_url,
        set_store,
    } = &cli.command
    {
        if let Some(url) = set_api_url {
            client_config.api_url = url.clone();
        }
        if let Some(store) = set_store {
            client_config.store = store.clone();
        }
        client_config.save(&config_path)?;
        println!("Saved {}.", config_path.display());
        return Ok(());
    }

    let session_config = client_config.session_config(cli.api_url.as_deref());
    debug!("api: {}{}", session_config.api_url, session_config.api_prefix);
    let sm = commands::open_session(&session_config)?;

    match cli.command {
        Commands::Login { email, password } => {
            let email = match email {
                Some(email) => email,
                None => {
                    eprint!("Email: ");
                    std::io::stderr().flush()?;
                    let mut s = String::new();
                    std::io::stdin().read_line(&mut s)?;
                    s.trim().to_string()
                }
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            if email.is_empty() || password.is_empty() {
                anyhow::bail!("Email and password are required.");
            }
            commands::auth::login(&sm, &email, &password).await?;
        }
        Commands::Logout => commands::auth::logout(&sm).await?,
        Commands::Whoami => commands::auth::whoami(&sm, cli.json).await?,
        Commands::Route { path } => commands::access::route(&sm, &path, cli.json).await?,
        Commands::Can { permissions } => commands::access::can(&sm, &permissions).await?,
        Commands::Theme { toggle } => commands::theme::theme(&sm, toggle, cli.json).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
