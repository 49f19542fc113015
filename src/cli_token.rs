//! Offline helper to mint and inspect bearer tokens with the same settings
//! the server uses, without going through `POST /token`.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use show_catalog_server::auth::{
    token_lifetime, TokenIssuer, DEFAULT_TOKEN_LIFETIME_MINUTES, MAX_TOKEN_LIFETIME_MINUTES,
};

#[derive(Parser, Debug)]
struct CliArgs {
    /// The only identity allowed to hold a token.
    #[clap(long, env = "AUTH_ISSUER_VALID_USERNAME")]
    pub auth_username: String,

    /// Secret used to sign tokens.
    #[clap(long, env = "AUTH_ISSUER_SECRET_KEY", hide_env_values = true)]
    pub auth_secret: String,

    /// Lifetime of issued tokens, in minutes.
    #[clap(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = DEFAULT_TOKEN_LIFETIME_MINUTES)]
    pub token_lifetime_minutes: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mints a token for the given identity and prints it.
    Issue { identity: String },

    /// Checks a token and prints its claims.
    Verify { token: String },
}

/// Runs the requested command and returns what should be printed.
fn run(args: CliArgs) -> Result<String> {
    let lifetime = token_lifetime(args.token_lifetime_minutes).ok_or_else(|| {
        anyhow!(
            "token lifetime must be between 1 and {} minutes, got {}",
            MAX_TOKEN_LIFETIME_MINUTES,
            args.token_lifetime_minutes
        )
    })?;
    let issuer = TokenIssuer::new(args.auth_username, args.auth_secret.as_bytes(), lifetime);

    match args.command {
        Command::Issue { identity } => {
            let issued = issuer
                .issue(&identity)
                .with_context(|| format!("Cannot issue a token for {:?}", identity))?;
            Ok(issued.token)
        }
        Command::Verify { token } => {
            let claims = issuer.verify(&token).context("Token rejected")?;
            let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| claims.exp.to_string());
            Ok(format!(
                "sub: {}\niat: {}\nexp: {} ({})",
                claims.sub, claims.iat, claims.exp, expires
            ))
        }
    }
}

fn main() -> Result<()> {
    println!("{}", run(CliArgs::parse())?);
    Ok(())
}
