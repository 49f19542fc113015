use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use show_catalog_server::auth::{TokenIssuer, DEFAULT_TOKEN_LIFETIME_MINUTES};
use show_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use show_catalog_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use show_catalog_server::show_store::SqliteShowStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite shows database file, created if missing.
    #[clap(value_parser = parse_path, env = "SHOWS_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "SHOWS_PORT", default_value_t = 5000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, env = "SHOWS_METRICS_PORT", default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The only identity that can obtain a token.
    #[clap(long, env = "AUTH_ISSUER_VALID_USERNAME")]
    pub auth_username: Option<String>,

    /// Secret used to sign tokens.
    #[clap(long, env = "AUTH_ISSUER_SECRET_KEY", hide_env_values = true)]
    pub auth_secret: Option<String>,

    /// Lifetime of issued tokens, in minutes.
    #[clap(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = DEFAULT_TOKEN_LIFETIME_MINUTES)]
    pub token_lifetime_minutes: i64,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = 4)]
    pub read_pool_size: usize,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_path: args.db_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            auth_username: args.auth_username.clone(),
            auth_secret: args.auth_secret.clone(),
            token_lifetime_minutes: args.token_lifetime_minutes,
            read_pool_size: args.read_pool_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;
    info!("Resolved config: {:?}", config);

    info!("Opening SQLite shows database at {:?}...", config.db_path);
    let show_store = Arc::new(SqliteShowStore::new(
        &config.db_path,
        config.read_pool_size,
    )?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    let token_issuer = Arc::new(TokenIssuer::new(
        config.auth_username.clone(),
        config.auth_secret.as_bytes(),
        config.token_lifetime,
    ));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        metrics_port: config.metrics_port,
    };

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(show_store, token_issuer, server_config).await
}
