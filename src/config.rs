use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub base_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "JSON:API rentals service")]
pub struct Args {
    /// Host to bind to (overrides RENTALS_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides RENTALS_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides RENTALS_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public base URL for resource links (overrides RENTALS_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        Self::resolve(args, |key| env::var(key))
    }

    /// Merge parsed `args` over values read through `var`, then defaults.
    pub fn resolve<F>(args: Args, var: F) -> Result<(Self, bool)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = var("RENTALS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match var("RENTALS_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing RENTALS_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading RENTALS_PORT"),
        };
        let env_db =
            var("RENTALS_DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/rentals.db".into());
        let env_base = var("RENTALS_BASE_URL").ok().filter(|s| !s.is_empty());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            base_url: args.base_url.or(env_base),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
